use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::models::FoodItem;

/// The user's selected foods, unique by case-insensitive description.
///
/// Insertion order is kept; it is the order foods are shown and exported in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodSelection {
    foods: Vec<FoodItem>,
}

impl FoodSelection {
    /// Build a selection, deduplicating by description (last occurrence wins,
    /// first position is kept).
    pub fn new(foods: Vec<FoodItem>) -> Self {
        let mut selection = Self::default();
        for food in foods {
            selection.upsert(food);
        }
        selection
    }

    fn position(&self, description: &str) -> Option<usize> {
        let key = description.to_lowercase();
        self.foods.iter().position(|f| f.key() == key)
    }

    /// Get a food by description (case-insensitive).
    pub fn get(&self, description: &str) -> Option<&FoodItem> {
        self.position(description).map(|i| &self.foods[i])
    }

    pub fn get_mut(&mut self, description: &str) -> Option<&mut FoodItem> {
        self.position(description).map(move |i| &mut self.foods[i])
    }

    pub fn contains(&self, description: &str) -> bool {
        self.position(description).is_some()
    }

    /// Add a food unless one with the same description is already selected.
    pub fn add(&mut self, food: FoodItem) -> bool {
        if self.contains(&food.description) {
            debug!(food = %food.description, "food already selected");
            return false;
        }
        self.foods.push(food);
        true
    }

    /// Insert or replace a food in place.
    pub fn upsert(&mut self, food: FoodItem) {
        match self.position(&food.description) {
            Some(i) => self.foods[i] = food,
            None => self.foods.push(food),
        }
    }

    /// Merge imported foods; existing entries are replaced.
    pub fn merge(&mut self, foods: Vec<FoodItem>) -> usize {
        let count = foods.len();
        for food in foods {
            self.upsert(food);
        }
        count
    }

    pub fn remove(&mut self, description: &str) -> Result<FoodItem> {
        let index = self
            .position(description)
            .ok_or_else(|| PlannerError::InvalidInput(format!("{} is not selected", description)))?;
        Ok(self.foods.remove(index))
    }

    pub fn set_integer_servings(&mut self, description: &str, value: bool) -> Result<()> {
        self.require_mut(description)?.integer_servings = value;
        Ok(())
    }

    pub fn set_must_include(&mut self, description: &str, value: bool) -> Result<()> {
        self.require_mut(description)?.must_include = value;
        Ok(())
    }

    fn require_mut(&mut self, description: &str) -> Result<&mut FoodItem> {
        self.get_mut(description)
            .ok_or_else(|| PlannerError::InvalidInput(format!("{} is not selected", description)))
    }

    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn clear(&mut self) {
        self.foods.clear();
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn into_foods(self) -> Vec<FoodItem> {
        self.foods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutrientMap;

    fn food(description: &str, price: f64) -> FoodItem {
        FoodItem {
            price: Some(price),
            ..FoodItem::new(description, description, NutrientMap::new())
        }
    }

    #[test]
    fn test_get_case_insensitive() {
        let selection = FoodSelection::new(vec![food("Apple", 0.5), food("Bread", 1.0)]);
        assert!(selection.get("apple").is_some());
        assert!(selection.get("APPLE").is_some());
        assert!(selection.get("banana").is_none());
    }

    #[test]
    fn test_new_deduplicates_last_wins() {
        let selection = FoodSelection::new(vec![food("Apple", 0.5), food("Bread", 1.0), food("apple", 0.7)]);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.foods()[0].price, Some(0.7));
        assert_eq!(selection.foods()[1].description, "Bread");
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut selection = FoodSelection::default();
        assert!(selection.add(food("Rice", 0.2)));
        assert!(!selection.add(food("rice", 0.3)));
        assert_eq!(selection.get("rice").unwrap().price, Some(0.2));
    }

    #[test]
    fn test_flags_and_remove() {
        let mut selection = FoodSelection::new(vec![food("Eggs", 0.3)]);
        selection.set_must_include("eggs", true).unwrap();
        selection.set_integer_servings("eggs", true).unwrap();
        let eggs = selection.get("Eggs").unwrap();
        assert!(eggs.must_include && eggs.integer_servings);

        assert!(selection.set_must_include("milk", true).is_err());
        assert!(selection.remove("EGGS").is_ok());
        assert!(selection.is_empty());
    }
}
