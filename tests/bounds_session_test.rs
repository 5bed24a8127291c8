use tempfile::TempDir;

use knapsnack_rs::PlannerError;
use knapsnack_rs::models::{Nutrient, NutrientGoals, NutrientMap, NutritionCalculationResponse};
use knapsnack_rs::state::{
    BoundSide, EditableTarget, ErrorKey, FileStore, NutrientBoundsStore, SavedBounds, StateSlice,
    load_slice, save_slice,
};

fn calculation() -> NutritionCalculationResponse {
    let json = r#"{
        "lower_bounds": {"Iron (mg)": 8, "Calcium (mg)": 1000, "Water (mL)": 3700, "protein": 120},
        "upper_bounds": {"Iron (mg)": 45, "Calcium (mg)": 2500, "Sodium (mg)": 2300},
        "fibre": 38,
        "saturated_fats": 24,
        "carbohydrate": 300,
        "protein": 140,
        "fats": 75,
        "bmr": 1750,
        "tdee": 2700,
        "daily_caloric_intake": 2700
    }"#;
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_cancel_restores_snapshot_exactly() {
    let mut store = NutrientBoundsStore::from_calculation(calculation());
    let before_lower = store.lower_bounds().clone();
    let before_upper = store.upper_bounds().clone();

    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Iron, BoundSide::Lower, "60").unwrap();
    store.handle_bound_change(Nutrient::Sodium, BoundSide::Upper, "").unwrap();
    store.handle_bound_change(Nutrient::Zinc, BoundSide::Lower, "11").unwrap();
    assert!(store.has_errors());

    store.cancel().unwrap();
    assert!(!store.is_customising());
    assert_eq!(store.lower_bounds(), &before_lower);
    assert_eq!(store.upper_bounds(), &before_upper);
    assert!(!store.has_errors());
    assert!(!store.use_custom());
}

#[test]
fn test_save_sets_custom_only_when_changed() {
    let mut store = NutrientBoundsStore::from_calculation(calculation());

    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Iron, BoundSide::Lower, "8").unwrap();
    assert!(store.save().unwrap());
    assert!(!store.use_custom());

    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Zinc, BoundSide::Lower, "11").unwrap();
    // A new key absent from the defaults counts as a change
    assert!(store.save().unwrap());
    assert!(store.use_custom());

    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Sodium, BoundSide::Upper, "").unwrap();
    assert_eq!(
        store.validation_errors().get(&ErrorKey::Bound(Nutrient::Sodium, BoundSide::Lower)),
        Some(&"At least one bound is required".to_string())
    );
    assert!(!store.save().unwrap());
    store.cancel().unwrap();
    assert_eq!(store.upper_bounds()[&Nutrient::Sodium], 2300.0);
}

#[test]
fn test_reset_preserves_targets() {
    let mut store = NutrientBoundsStore::from_calculation(calculation());

    for (target, value) in [
        (EditableTarget::Fibre, "30"),
        (EditableTarget::SaturatedFats, "18"),
        (EditableTarget::Water, "3000"),
    ] {
        store.start_editing(target).unwrap();
        store.set_editing_value(target, value).unwrap();
        assert!(store.save_target(target).unwrap());
    }
    store.start_editing(EditableTarget::Water).unwrap();
    store.set_editing_value(EditableTarget::Water, "x").unwrap();

    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Iron, BoundSide::Lower, "99").unwrap();
    store.handle_bound_change(Nutrient::Calcium, BoundSide::Upper, "3000").unwrap();
    store.reset_bounds().unwrap();

    assert_eq!(store.lower_bounds()[&Nutrient::Iron], 8.0);
    assert_eq!(store.upper_bounds()[&Nutrient::Calcium], 2500.0);
    assert_eq!(store.lower_bounds()[&Nutrient::Fibre], 30.0);
    assert_eq!(store.upper_bounds()[&Nutrient::SaturatedFats], 18.0);
    assert_eq!(store.lower_bounds()[&Nutrient::Water], 3000.0);
    // Grid errors are gone, the target error survives
    assert_eq!(store.validation_errors().len(), 1);
    assert!(store.validation_errors().contains_key(&ErrorKey::Target(EditableTarget::Water)));
    // The flag is only recomputed on save
    assert!(store.use_custom());

    store.cancel_editing(EditableTarget::Water);
    assert!(store.save().unwrap());
    assert!(store.use_custom());
}

#[test]
fn test_reset_clears_errors_on_emptied_targets() {
    let mut store = NutrientBoundsStore::from_calculation(calculation());
    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Fibre, BoundSide::Lower, "").unwrap();
    store.handle_bound_change(Nutrient::Water, BoundSide::Lower, "").unwrap();
    assert!(store.has_errors());

    store.reset_bounds().unwrap();
    assert_eq!(store.lower_bounds()[&Nutrient::Fibre], 38.0);
    assert_eq!(store.lower_bounds()[&Nutrient::Water], 3700.0);
    assert!(store.validation_errors().is_empty());
    assert!(store.save().unwrap());
    assert!(!store.is_customising());
}

#[test]
fn test_edits_outside_session_are_rejected() {
    let mut store = NutrientBoundsStore::from_calculation(calculation());
    assert!(matches!(store.save(), Err(PlannerError::NotCustomising)));
    assert!(matches!(store.cancel(), Err(PlannerError::NotCustomising)));
    assert!(matches!(store.reset_bounds(), Err(PlannerError::NotCustomising)));
}

#[test]
fn test_bounds_persist_through_file_store() {
    let dir = TempDir::new().unwrap();
    let mut files = FileStore::open(dir.path()).unwrap();

    let mut store = NutrientBoundsStore::from_calculation(calculation());
    store.start_customising().unwrap();
    store.handle_bound_change(Nutrient::Iron, BoundSide::Upper, "40").unwrap();
    assert!(store.save().unwrap());

    save_slice(&mut files, StateSlice::CustomBounds, &store.saved_bounds()).unwrap();
    save_slice(&mut files, StateSlice::NutrientGoals, &store.nutrient_goals()).unwrap();

    let saved: SavedBounds = load_slice(&files, StateSlice::CustomBounds).unwrap().unwrap();
    assert!(saved.use_custom_bounds);
    assert_eq!(saved.adjusted_upper_bounds[&Nutrient::Iron], 40.0);

    let goals: NutrientGoals = load_slice(&files, StateSlice::NutrientGoals).unwrap().unwrap();
    assert_eq!(goals.upper_bounds[&Nutrient::Iron], 40.0);
    assert_eq!(goals.lower_bounds[&Nutrient::Fibre], 38.0);

    let restored = NutrientBoundsStore::with_saved(calculation(), Some(saved));
    assert!(restored.use_custom());
    assert_eq!(restored.upper_bounds()[&Nutrient::Iron], 40.0);
}

#[test]
fn test_new_calculation_is_hard_reset() {
    let mut lower = NutrientMap::new();
    lower.insert(Nutrient::Iron, 18.0);
    let saved = SavedBounds {
        use_custom_bounds: true,
        adjusted_lower_bounds: lower,
        adjusted_upper_bounds: NutrientMap::new(),
    };
    let mut store = NutrientBoundsStore::with_saved(calculation(), Some(saved));
    assert!(store.use_custom());

    store.start_customising().unwrap();
    store.replace_calculation(calculation());
    assert!(!store.is_customising());
    assert!(!store.use_custom());
    assert_eq!(store.lower_bounds()[&Nutrient::Iron], 8.0);
}
