use serde::{Deserialize, Deserializer, Serialize};

use crate::models::nutrient::{NutrientMap, deserialize_nutrient_map};
use crate::planner::constants::DEFAULT_SERVING_SIZE_G;

/// A selected food with its per-100 g nutrient profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    #[serde(deserialize_with = "string_or_number")]
    pub fdc_id: String,

    pub description: String,

    #[serde(deserialize_with = "deserialize_nutrient_map")]
    pub nutrients: NutrientMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Grams per serving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,

    /// Maximum grams per day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_serving: Option<f64>,

    #[serde(default)]
    pub integer_servings: bool,

    #[serde(default)]
    pub must_include: bool,
}

impl FoodItem {
    pub fn new(fdc_id: impl Into<String>, description: impl Into<String>, nutrients: NutrientMap) -> Self {
        Self {
            fdc_id: fdc_id.into(),
            description: description.into(),
            nutrients,
            price: None,
            serving_size: None,
            max_serving: None,
            integer_servings: false,
            must_include: false,
        }
    }

    /// Serving size in grams, falling back to 100 g when unset or zero.
    pub fn serving_size_g(&self) -> f64 {
        match self.serving_size {
            Some(size) if size > 0.0 && size.is_finite() => size,
            _ => DEFAULT_SERVING_SIZE_G,
        }
    }

    /// Price per serving, zero when unset.
    pub fn price_per_serving(&self) -> f64 {
        self.price.filter(|p| p.is_finite()).unwrap_or(0.0)
    }

    pub fn max_serving_g(&self) -> f64 {
        self.max_serving.filter(|m| m.is_finite()).unwrap_or(0.0)
    }

    /// Nutrient amounts for one serving instead of 100 g.
    pub fn nutrients_per_serving(&self) -> NutrientMap {
        scale_to_serving(&self.nutrients, self.serving_size_g())
    }

    /// Canonical key for lookups (lowercase description).
    pub fn key(&self) -> String {
        self.description.to_lowercase()
    }
}

/// Scale a per-100 g profile to a serving of `serving_size_g`.
pub fn scale_to_serving(nutrients: &NutrientMap, serving_size_g: f64) -> NutrientMap {
    nutrients
        .iter()
        .map(|(n, v)| (*n, v * serving_size_g / 100.0))
        .collect()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrient;

    fn sample_food() -> FoodItem {
        let mut nutrients = NutrientMap::new();
        nutrients.insert(Nutrient::Protein, 20.0);
        nutrients.insert(Nutrient::Iron, 2.5);
        FoodItem {
            price: Some(1.25),
            serving_size: Some(150.0),
            ..FoodItem::new("123", "Lentils", nutrients)
        }
    }

    #[test]
    fn test_serving_size_defaults() {
        let mut food = sample_food();
        assert_eq!(food.serving_size_g(), 150.0);
        food.serving_size = None;
        assert_eq!(food.serving_size_g(), 100.0);
        food.serving_size = Some(0.0);
        assert_eq!(food.serving_size_g(), 100.0);
    }

    #[test]
    fn test_nutrients_per_serving() {
        let per_serving = sample_food().nutrients_per_serving();
        assert!((per_serving[&Nutrient::Protein] - 30.0).abs() < 1e-9);
        assert!((per_serving[&Nutrient::Iron] - 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_numeric_fdc_id() {
        let json = r#"{"fdcId": 170567, "description": "Oats", "nutrients": {"protein": 13.2}, "servingSize": 40}"#;
        let food: FoodItem = serde_json::from_str(json).unwrap();
        assert_eq!(food.fdc_id, "170567");
        assert_eq!(food.nutrients[&Nutrient::Protein], 13.2);
        assert!(!food.must_include);
        assert_eq!(food.price_per_serving(), 0.0);
    }
}
