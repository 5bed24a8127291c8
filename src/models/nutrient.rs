use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strsim::jaro_winkler;

/// Nutrient amounts keyed by nutrient.
///
/// Food profiles are per 100 g; goals and bounds are per day.
pub type NutrientMap = BTreeMap<Nutrient, f64>;

/// Grouping used for display and rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientCategory {
    Macronutrient,
    Vitamin,
    Mineral,
    Other,
    Hydration,
}

/// Every nutrient the planner tracks.
///
/// Variant order is the CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Nutrient {
    Water,
    Carbohydrate,
    Fibre,
    Fats,
    SaturatedFats,
    Protein,
    Thiamin,
    Riboflavin,
    Niacin,
    PantothenicAcid,
    VitaminB6,
    Choline,
    Folate,
    VitaminA,
    VitaminC,
    VitaminE,
    VitaminK,
    Calcium,
    Iron,
    Magnesium,
    Manganese,
    Phosphorus,
    Potassium,
    Selenium,
    Sodium,
    Zinc,
}

struct NutrientInfo {
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    csv_header: &'static str,
    csv_aliases: &'static [&'static str],
    category: NutrientCategory,
}

use NutrientCategory::*;

const fn info(
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    csv_header: &'static str,
    csv_aliases: &'static [&'static str],
    category: NutrientCategory,
) -> NutrientInfo {
    NutrientInfo {
        key,
        name,
        unit,
        csv_header,
        csv_aliases,
        category,
    }
}

impl Nutrient {
    pub const ALL: [Nutrient; 26] = [
        Nutrient::Water,
        Nutrient::Carbohydrate,
        Nutrient::Fibre,
        Nutrient::Fats,
        Nutrient::SaturatedFats,
        Nutrient::Protein,
        Nutrient::Thiamin,
        Nutrient::Riboflavin,
        Nutrient::Niacin,
        Nutrient::PantothenicAcid,
        Nutrient::VitaminB6,
        Nutrient::Choline,
        Nutrient::Folate,
        Nutrient::VitaminA,
        Nutrient::VitaminC,
        Nutrient::VitaminE,
        Nutrient::VitaminK,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::Magnesium,
        Nutrient::Manganese,
        Nutrient::Phosphorus,
        Nutrient::Potassium,
        Nutrient::Selenium,
        Nutrient::Sodium,
        Nutrient::Zinc,
    ];

    fn info(self) -> NutrientInfo {
        match self {
            Nutrient::Water => info("Water (mL)", "Water", "mL", "Water (mL)", &[], Hydration),
            Nutrient::Carbohydrate => info(
                "Carbohydrate (g)",
                "Carbohydrates",
                "g",
                "Carbohydrate (g)",
                &[],
                Macronutrient,
            ),
            Nutrient::Fibre => info("Fibre (g)", "Fibre", "g", "Fibre (g)", &[], Macronutrient),
            Nutrient::Fats => info("Fats (g)", "Fats", "g", "Fats (g)", &[], Macronutrient),
            Nutrient::SaturatedFats => info(
                "Saturated Fats (g)",
                "Saturated Fats",
                "g",
                "Saturated Fats (g)",
                &[],
                Macronutrient,
            ),
            Nutrient::Protein => {
                info("Protein (g)", "Protein", "g", "Protein (g)", &[], Macronutrient)
            }
            Nutrient::Thiamin => info(
                "Thiamin (mg)",
                "Thiamin (Vitamin B1)",
                "mg",
                "Thiamin (Vitamin B1) (mg)",
                &["Thiamin (Vitamin B₁) (mg)", "Thiamin (mg)"],
                Vitamin,
            ),
            Nutrient::Riboflavin => info(
                "Riboflavin (mg)",
                "Riboflavin (Vitamin B2)",
                "mg",
                "Riboflavin (Vitamin B2) (mg)",
                &["Riboflavin (Vitamin B₂) (mg)", "Riboflavin (mg)"],
                Vitamin,
            ),
            Nutrient::Niacin => info(
                "Niacin (mg)",
                "Niacin (Vitamin B3)",
                "mg",
                "Niacin (Vitamin B3) (mg)",
                &["Niacin (Vitamin B₃) (mg)", "Niacin (mg)"],
                Vitamin,
            ),
            Nutrient::PantothenicAcid => info(
                "Pantothenic Acid (mg)",
                "Pantothenic Acid (Vitamin B5)",
                "mg",
                "Pantothenic Acid (Vitamin B5) (mg)",
                &["Pantothenic Acid (Vitamin B₅) (mg)", "Pantothenic Acid (mg)"],
                Vitamin,
            ),
            Nutrient::VitaminB6 => info(
                "Vitamin B6 (mg)",
                "Vitamin B6",
                "mg",
                "Vitamin B6 (mg)",
                &[],
                Vitamin,
            ),
            Nutrient::Choline => info("Choline (mg)", "Choline", "mg", "Choline (mg)", &[], Other),
            Nutrient::Folate => info(
                "Folate (µg)",
                "Folate (Vitamin B9)",
                "µg",
                "Folate (Vitamin B9) (mcg)",
                &["Folate (Vitamin B₉) (µg)", "Folate (µg)"],
                Vitamin,
            ),
            Nutrient::VitaminA => info(
                "Vitamin A (µg)",
                "Vitamin A",
                "µg",
                "Vitamin A (mcg)",
                &["Vitamin A (µg)"],
                Vitamin,
            ),
            Nutrient::VitaminC => info(
                "Vitamin C (mg)",
                "Vitamin C",
                "mg",
                "Vitamin C (mg)",
                &[],
                Vitamin,
            ),
            Nutrient::VitaminE => info(
                "Vitamin E (mg)",
                "Vitamin E",
                "mg",
                "Vitamin E (mg)",
                &[],
                Vitamin,
            ),
            Nutrient::VitaminK => info(
                "Vitamin K (µg)",
                "Vitamin K",
                "µg",
                "Vitamin K (mcg)",
                &["Vitamin K (µg)"],
                Vitamin,
            ),
            Nutrient::Calcium => info("Calcium (mg)", "Calcium", "mg", "Calcium (mg)", &[], Mineral),
            Nutrient::Iron => info("Iron (mg)", "Iron", "mg", "Iron (mg)", &[], Mineral),
            Nutrient::Magnesium => info(
                "Magnesium (mg)",
                "Magnesium",
                "mg",
                "Magnesium (mg)",
                &[],
                Mineral,
            ),
            Nutrient::Manganese => info(
                "Manganese (mg)",
                "Manganese",
                "mg",
                "Manganese (mg)",
                &[],
                Mineral,
            ),
            Nutrient::Phosphorus => info(
                "Phosphorus (mg)",
                "Phosphorus",
                "mg",
                "Phosphorus (mg)",
                &[],
                Mineral,
            ),
            Nutrient::Potassium => info(
                "Potassium (mg)",
                "Potassium",
                "mg",
                "Potassium (mg)",
                &[],
                Mineral,
            ),
            Nutrient::Selenium => info(
                "Selenium (µg)",
                "Selenium",
                "µg",
                "Selenium (mcg)",
                &["Selenium (µg)"],
                Mineral,
            ),
            Nutrient::Sodium => info("Sodium (mg)", "Sodium", "mg", "Sodium (mg)", &[], Mineral),
            Nutrient::Zinc => info("Zinc (mg)", "Zinc", "mg", "Zinc (mg)", &[], Mineral),
        }
    }

    /// Canonical identifier, e.g. `"Vitamin A (µg)"`.
    pub fn key(self) -> &'static str {
        self.info().key
    }

    /// Human-readable name without the unit.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn unit(self) -> &'static str {
        self.info().unit
    }

    /// Column label written on CSV export.
    pub fn csv_header(self) -> &'static str {
        self.info().csv_header
    }

    /// Legacy column labels accepted on import, tried after the primary header.
    pub fn csv_aliases(self) -> &'static [&'static str] {
        self.info().csv_aliases
    }

    pub fn category(self) -> NutrientCategory {
        self.info().category
    }

    /// Decimal places used when displaying a daily total.
    pub fn display_decimals(self) -> u32 {
        match self.category() {
            Macronutrient | Hydration => 0,
            Vitamin | Mineral | Other => 1,
        }
    }

    /// Short keys the calculator uses for the macronutrient targets.
    fn legacy_key(self) -> Option<&'static str> {
        match self {
            Nutrient::Carbohydrate => Some("carbohydrate"),
            Nutrient::Fibre => Some("fibre"),
            Nutrient::Fats => Some("fats"),
            Nutrient::SaturatedFats => Some("saturated_fats"),
            Nutrient::Protein => Some("protein"),
            _ => None,
        }
    }

    /// Resolve a canonical or legacy key.
    pub fn from_key(key: &str) -> Option<Nutrient> {
        Nutrient::ALL
            .into_iter()
            .find(|n| n.key() == key || n.legacy_key() == Some(key))
    }

    /// Fuzzy lookup by key or name for interactive input.
    pub fn find_closest(input: &str) -> Option<Nutrient> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return None;
        }
        if let Some(exact) = Nutrient::from_key(&input).or_else(|| {
            Nutrient::ALL
                .into_iter()
                .find(|n| n.key().to_lowercase() == input || n.name().to_lowercase() == input)
        }) {
            return Some(exact);
        }

        Nutrient::ALL
            .into_iter()
            .map(|n| {
                let score = jaro_winkler(&n.key().to_lowercase(), &input)
                    .max(jaro_winkler(&n.name().to_lowercase(), &input));
                (n, score)
            })
            .filter(|(_, score)| *score > 0.7)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(n, _)| n)
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Nutrient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Nutrient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Nutrient::from_key(&key)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown nutrient: {}", key)))
    }
}

/// Lenient deserializer for nutrient maps coming from external services.
///
/// Unknown keys and null amounts are dropped instead of failing the payload.
pub fn deserialize_nutrient_map<'de, D>(deserializer: D) -> Result<NutrientMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Option<f64>> = BTreeMap::deserialize(deserializer)?;
    let mut map = NutrientMap::new();
    for (key, value) in raw {
        match (Nutrient::from_key(&key), value) {
            (Some(nutrient), Some(amount)) if amount.is_finite() => {
                map.insert(nutrient, amount);
            }
            (None, _) => tracing::debug!(key = %key, "ignoring unknown nutrient key"),
            _ => {}
        }
    }
    Ok(map)
}
