use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{FoodItem, Nutrient, NutrientMap, OptimisationApiResult};
use crate::planner::constants::{CURRENCY_DECIMALS, SERVINGS_DECIMALS};
use crate::planner::rounding::bankers_round;

/// One food in the optimised plan, derived from rounded servings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultItem {
    pub food: String,
    /// Servings rounded to one decimal.
    pub servings: f64,
    pub serving_size: f64,
    pub total_serving_grams: f64,
    pub cost: f64,
    pub nutrients: NutrientMap,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultTotals {
    pub cost: f64,
    pub nutrients: NutrientMap,
}

/// Items and totals where every total is the sum of the visible items.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConsistentResults {
    pub items: Vec<ResultItem>,
    pub totals: ResultTotals,
}

/// Turn raw optimizer output into display figures.
///
/// Servings are rounded first and every other figure is derived from the
/// rounded value, so totals always equal the sum of the rows. Items that
/// round to zero servings or have no matching food are skipped.
pub fn calculate_consistent_results(
    result: &OptimisationApiResult,
    foods: &[FoodItem],
) -> ConsistentResults {
    if result.food_items.len() != result.servings.len() {
        warn!(
            food_items = result.food_items.len(),
            servings = result.servings.len(),
            "optimizer result has mismatched lengths; extra entries ignored"
        );
    }

    let mut by_description: HashMap<&str, &FoodItem> = HashMap::new();
    for food in foods {
        by_description.entry(food.description.as_str()).or_insert(food);
    }

    let mut totals = ResultTotals::default();
    let mut items = Vec::new();

    for (name, &raw_servings) in result.food_items.iter().zip(&result.servings) {
        let servings = bankers_round(raw_servings, SERVINGS_DECIMALS);
        if !(servings > 0.0) {
            debug!(food = %name, raw_servings, "dropping item with no servings after rounding");
            continue;
        }

        let Some(food) = by_description.get(name.as_str()) else {
            warn!(food = %name, "optimizer returned a food that is not selected; skipping");
            continue;
        };

        let serving_size = food.serving_size_g();
        let total_serving_grams = servings * serving_size;
        let cost = bankers_round(servings * food.price_per_serving(), CURRENCY_DECIMALS);

        let nutrients: NutrientMap = food
            .nutrients
            .iter()
            .map(|(nutrient, per_100g)| (*nutrient, per_100g * total_serving_grams / 100.0))
            .collect();

        totals.cost += cost;
        for (nutrient, amount) in &nutrients {
            *totals.nutrients.entry(*nutrient).or_insert(0.0) += amount;
        }

        items.push(ResultItem {
            food: name.clone(),
            servings,
            serving_size,
            total_serving_grams,
            cost,
            nutrients,
        });
    }

    // Each item cost is already at 2dp; this only removes float noise from the sum.
    totals.cost = bankers_round(totals.cost, CURRENCY_DECIMALS);

    ConsistentResults { items, totals }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sortable columns of the portions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Food,
    ServingSize,
    Servings,
    TotalServing,
    Cost,
}

/// Sortable columns of the nutrient table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientSortKey {
    Name,
    Amount,
    Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig<K> {
    pub key: Option<K>,
    pub direction: SortDirection,
}

impl<K> Default for SortConfig<K> {
    fn default() -> Self {
        Self {
            key: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl<K: Copy + PartialEq> SortConfig<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Select a column; selecting the ascending column again flips it.
    pub fn request_sort(&mut self, key: K) {
        self.direction = if self.key == Some(key) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.key = Some(key);
    }

    pub fn sort_icon(&self, key: K) -> Option<&'static str> {
        if self.key != Some(key) {
            return None;
        }
        Some(match self.direction {
            SortDirection::Ascending => " ↑",
            SortDirection::Descending => " ↓",
        })
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Sort aggregated items. Ties keep their original order.
pub fn sort_items(items: &[ResultItem], config: &SortConfig<SortKey>) -> Vec<ResultItem> {
    let mut sorted = items.to_vec();
    let Some(key) = config.key else {
        return sorted;
    };

    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Food => a.food.to_lowercase().cmp(&b.food.to_lowercase()),
            SortKey::ServingSize => cmp_f64(a.serving_size, b.serving_size),
            SortKey::Servings => cmp_f64(a.servings, b.servings),
            SortKey::TotalServing => cmp_f64(a.total_serving_grams, b.total_serving_grams),
            SortKey::Cost => cmp_f64(a.cost, b.cost),
        };
        config.apply(ordering)
    });
    sorted
}

/// A daily total ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientRow {
    pub nutrient: Nutrient,
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

/// Display rows for every nutrient, rounded by nutrient category.
pub fn nutrient_rows(totals: &ResultTotals) -> Vec<NutrientRow> {
    Nutrient::ALL
        .into_iter()
        .map(|nutrient| NutrientRow {
            nutrient,
            name: nutrient.name(),
            value: bankers_round(
                totals.nutrients.get(&nutrient).copied().unwrap_or(0.0),
                nutrient.display_decimals(),
            ),
            unit: nutrient.unit(),
        })
        .collect()
}

pub fn sort_nutrient_rows(
    rows: &[NutrientRow],
    config: &SortConfig<NutrientSortKey>,
) -> Vec<NutrientRow> {
    let mut sorted = rows.to_vec();
    let Some(key) = config.key else {
        return sorted;
    };

    sorted.sort_by(|a, b| {
        let ordering = match key {
            NutrientSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            NutrientSortKey::Amount => cmp_f64(a.value, b.value),
            NutrientSortKey::Unit => a.unit.to_lowercase().cmp(&b.unit.to_lowercase()),
        };
        config.apply(ordering)
    });
    sorted
}
