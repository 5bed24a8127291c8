use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::nutrient::{NutrientMap, deserialize_nutrient_map};

/// Output of the remote calorie/macro calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionCalculationResponse {
    #[serde(deserialize_with = "deserialize_nutrient_map")]
    pub lower_bounds: NutrientMap,
    #[serde(deserialize_with = "deserialize_nutrient_map")]
    pub upper_bounds: NutrientMap,
    /// Computed fibre target (g), applied as a lower bound.
    pub fibre: f64,
    /// Computed saturated fat target (g), applied as an upper bound.
    pub saturated_fats: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fats: f64,
    pub bmr: f64,
    pub tdee: f64,
    pub daily_caloric_intake: f64,
}

/// Raw result of the remote diet optimizer. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimisationApiResult {
    pub food_items: Vec<String>,
    pub servings: Vec<f64>,
    #[serde(default)]
    pub overflow_by_nutrient: BTreeMap<String, f64>,
    #[serde(default)]
    pub total_overflow: f64,
}

/// Macro percentages as sent to the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRatios {
    pub protein: u8,
    pub carbohydrate: u8,
    pub fats: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

/// Personal details collected by the onboarding form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub gender: Gender,
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub activity: f64,
    /// Calorie target as a percentage of TDEE.
    pub percentage: u32,
    pub macro_ratios: MacroRatios,
    pub smoking: bool,
}

/// Committed bounds handed to the optimizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientGoals {
    pub lower_bounds: NutrientMap,
    pub upper_bounds: NutrientMap,
}

/// One food as the optimizer expects it: nutrients per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFoodPayload {
    pub fdc_id: String,
    pub description: String,
    pub price: f64,
    pub serving_size: f64,
    pub max_serving: f64,
    #[serde(rename = "requires_integer_servings")]
    pub requires_integer_servings: bool,
    #[serde(rename = "must_include")]
    pub must_include: bool,
    pub nutrients: NutrientMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimisationRequestPayload {
    #[serde(rename = "selected_foods")]
    pub selected_foods: Vec<SelectedFoodPayload>,
    #[serde(rename = "nutrient_goals")]
    pub nutrient_goals: NutrientGoals,
    pub age: u32,
    pub gender: String,
    pub smoking_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrient;

    #[test]
    fn test_calculation_response_parses_calculator_json() {
        let json = r#"{
            "lower_bounds": {"Iron (mg)": 8, "Water (mL)": 3700, "Vitamin D (µg)": 15},
            "upper_bounds": {"Iron (mg)": 45, "Sodium (mg)": null},
            "fibre": 38, "saturated_fats": 22, "carbohydrate": 310,
            "protein": 150, "fats": 70, "bmr": 1800, "tdee": 2600,
            "daily_caloric_intake": 2600
        }"#;
        let calc: NutritionCalculationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(calc.lower_bounds.len(), 2);
        assert_eq!(calc.lower_bounds[&Nutrient::Water], 3700.0);
        assert_eq!(calc.upper_bounds.len(), 1);
        assert_eq!(calc.fibre, 38.0);
    }

    #[test]
    fn test_optimisation_result_overflow_is_optional() {
        let json = r#"{"food_items": ["Oats"], "servings": [1.26]}"#;
        let result: OptimisationApiResult = serde_json::from_str(json).unwrap();
        assert!(result.overflow_by_nutrient.is_empty());
        assert_eq!(result.total_overflow, 0.0);
    }
}
