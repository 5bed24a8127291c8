use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::models::{Nutrient, NutrientGoals, NutrientMap, NutritionCalculationResponse};
use crate::planner::rounding::bankers_round;
use crate::state::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundSide {
    Lower,
    Upper,
}

impl BoundSide {
    pub fn label(self) -> &'static str {
        match self {
            BoundSide::Lower => "lower",
            BoundSide::Upper => "upper",
        }
    }
}

/// Single-value target editors shown above the bounds grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditableTarget {
    Fibre,
    SaturatedFats,
    Water,
}

impl EditableTarget {
    pub const ALL: [EditableTarget; 3] = [
        EditableTarget::Fibre,
        EditableTarget::SaturatedFats,
        EditableTarget::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EditableTarget::Fibre => "Fibre",
            EditableTarget::SaturatedFats => "Saturated Fats",
            EditableTarget::Water => "Water",
        }
    }

    pub fn nutrient(self) -> Nutrient {
        match self {
            EditableTarget::Fibre => Nutrient::Fibre,
            EditableTarget::SaturatedFats => Nutrient::SaturatedFats,
            EditableTarget::Water => Nutrient::Water,
        }
    }

    /// Which bound the target is written to.
    pub fn side(self) -> BoundSide {
        match self {
            EditableTarget::SaturatedFats => BoundSide::Upper,
            EditableTarget::Fibre | EditableTarget::Water => BoundSide::Lower,
        }
    }

    pub fn direction(self) -> &'static str {
        match self.side() {
            BoundSide::Lower => "≥",
            BoundSide::Upper => "≤",
        }
    }

    fn system_default(self, calc: &NutritionCalculationResponse) -> f64 {
        match self {
            EditableTarget::Fibre => calc.fibre,
            EditableTarget::SaturatedFats => calc.saturated_fats,
            EditableTarget::Water => calc.lower_bounds.get(&Nutrient::Water).copied().unwrap_or(0.0),
        }
    }
}

impl fmt::Display for EditableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field a validation message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    Bound(Nutrient, BoundSide),
    Target(EditableTarget),
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Bound(nutrient, side) => write!(f, "{}-{}", nutrient.key(), side.label()),
            ErrorKey::Target(target) => f.write_str(target.name()),
        }
    }
}

pub type ValidationErrors = BTreeMap<ErrorKey, String>;

/// Bounds plus the validation messages attached to them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsState {
    pub lower: NutrientMap,
    pub upper: NutrientMap,
    pub use_custom: bool,
    pub validation_errors: ValidationErrors,
}

/// Custom bounds as persisted between sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBounds {
    pub use_custom_bounds: bool,
    pub adjusted_lower_bounds: NutrientMap,
    pub adjusted_upper_bounds: NutrientMap,
}

const MSG_BOUND_REQUIRED: &str = "At least one bound is required";
const MSG_LOWER_EXCEEDS: &str = "Lower bound cannot exceed upper bound";
const MSG_UPPER_BELOW: &str = "Upper bound cannot be less than lower bound";
const MSG_NOT_A_NUMBER: &str = "Must be a positive number";

/// Parse user input; anything that is not a finite number is absent.
fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_amount(value: f64) -> String {
    format!("{}", bankers_round(value, 1))
}

fn side_map(state: &BoundsState, side: BoundSide) -> &NutrientMap {
    match side {
        BoundSide::Lower => &state.lower,
        BoundSide::Upper => &state.upper,
    }
}

fn side_map_mut(state: &mut BoundsState, side: BoundSide) -> &mut NutrientMap {
    match side {
        BoundSide::Lower => &mut state.lower,
        BoundSide::Upper => &mut state.upper,
    }
}

/// Owns the nutrient bounds and the customisation session over them.
///
/// Outside a session the bounds are read-only except through the target
/// editors. Inside a session grid edits are staged and either committed by
/// [`save`](Self::save) or discarded by [`cancel`](Self::cancel).
#[derive(Debug)]
pub struct NutrientBoundsStore {
    calculation: Option<NutritionCalculationResponse>,
    state: Transaction<BoundsState>,
    editing_values: BTreeMap<EditableTarget, String>,
    locked: bool,
}

impl Default for NutrientBoundsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NutrientBoundsStore {
    /// Empty store awaiting a calculation.
    pub fn new() -> Self {
        Self {
            calculation: None,
            state: Transaction::new(BoundsState::default()),
            editing_values: BTreeMap::new(),
            locked: false,
        }
    }

    /// Store seeded with the calculator's defaults.
    pub fn from_calculation(calculation: NutritionCalculationResponse) -> Self {
        let mut store = Self::new();
        store.replace_calculation(calculation);
        store
    }

    /// Store seeded from a calculation, restoring saved bounds when they were custom.
    pub fn with_saved(calculation: NutritionCalculationResponse, saved: Option<SavedBounds>) -> Self {
        let mut store = Self::from_calculation(calculation);
        if let Some(saved) = saved.filter(|s| s.use_custom_bounds) {
            store.state.reset(BoundsState {
                lower: saved.adjusted_lower_bounds,
                upper: saved.adjusted_upper_bounds,
                use_custom: true,
                validation_errors: ValidationErrors::new(),
            });
        }
        store
    }

    /// Install a new calculation, discarding everything else including an open session.
    pub fn replace_calculation(&mut self, calculation: NutritionCalculationResponse) {
        let (lower, upper) = canonical_defaults(&calculation);
        debug!(
            lower = lower.len(),
            upper = upper.len(),
            discarded_session = self.state.is_open(),
            "bounds reset from new calculation"
        );
        self.state.reset(BoundsState {
            lower,
            upper,
            use_custom: false,
            validation_errors: ValidationErrors::new(),
        });
        self.editing_values.clear();
        self.calculation = Some(calculation);
    }

    pub fn calculation(&self) -> Option<&NutritionCalculationResponse> {
        self.calculation.as_ref()
    }

    pub fn is_customising(&self) -> bool {
        self.state.is_open()
    }

    pub fn lower_bounds(&self) -> &NutrientMap {
        &self.state.get().lower
    }

    pub fn upper_bounds(&self) -> &NutrientMap {
        &self.state.get().upper
    }

    pub fn use_custom(&self) -> bool {
        self.state.get().use_custom
    }

    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.state.get().validation_errors
    }

    pub fn has_errors(&self) -> bool {
        !self.validation_errors().is_empty()
    }

    pub fn editing_value(&self, target: EditableTarget) -> Option<&str> {
        self.editing_values.get(&target).map(String::as_str)
    }

    /// Disable edits while a request that depends on these bounds is in flight.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(PlannerError::Locked);
        }
        Ok(())
    }

    fn ensure_customising(&self) -> Result<()> {
        self.ensure_unlocked()?;
        if !self.state.is_open() {
            return Err(PlannerError::NotCustomising);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk customisation session
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a session, snapshotting the committed bounds and errors.
    pub fn start_customising(&mut self) -> Result<()> {
        self.ensure_unlocked()?;
        if !self.state.begin() {
            return Err(PlannerError::SessionAlreadyOpen);
        }
        debug!("bounds customisation started");
        Ok(())
    }

    /// Set one side of a nutrient's bounds from raw input and revalidate it.
    ///
    /// Input that does not parse as a number clears that side.
    pub fn handle_bound_change(&mut self, nutrient: Nutrient, side: BoundSide, raw: &str) -> Result<()> {
        self.ensure_customising()?;
        let value = parse_amount(raw);

        let state = self.state.make_mut();
        match value {
            Some(v) => {
                side_map_mut(state, side).insert(nutrient, v);
            }
            None => {
                side_map_mut(state, side).remove(&nutrient);
            }
        }
        validate_bound(state, nutrient, side);
        Ok(())
    }

    /// Restore every bound to its computed default except the target keys,
    /// which keep whatever they currently hold.
    pub fn reset_bounds(&mut self) -> Result<()> {
        self.ensure_customising()?;
        let calculation = self.calculation.as_ref().ok_or(PlannerError::NoCalculation)?;
        let (mut lower, mut upper) = canonical_defaults(calculation);

        let state = self.state.make_mut();
        for target in EditableTarget::ALL {
            let nutrient = target.nutrient();
            if let Some(v) = state.lower.get(&nutrient) {
                lower.insert(nutrient, *v);
            }
            if let Some(v) = state.upper.get(&nutrient) {
                upper.insert(nutrient, *v);
            }
        }
        state.lower = lower;
        state.upper = upper;
        state
            .validation_errors
            .retain(|key, _| matches!(key, ErrorKey::Target(_)));
        for target in EditableTarget::ALL {
            validate_bound(state, target.nutrient(), target.side());
        }

        debug!("bounds reset to defaults, targets preserved");
        Ok(())
    }

    /// Commit the session if there are no validation errors.
    ///
    /// Returns `Ok(false)` and leaves the session open when errors block the commit.
    pub fn save(&mut self) -> Result<bool> {
        self.ensure_customising()?;
        if self.has_errors() {
            debug!(errors = self.validation_errors().len(), "save blocked by validation errors");
            return Ok(false);
        }

        let changed = self.bounds_changed(self.lower_bounds(), self.upper_bounds());
        self.state.make_mut().use_custom = changed;
        self.state.commit();
        debug!(use_custom = changed, "bounds customisation saved");
        Ok(true)
    }

    /// Discard the session, restoring bounds, flag and errors from the snapshot.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_customising()?;
        self.state.rollback();
        debug!("bounds customisation cancelled");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Target editors
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin editing a target, seeded with its current value.
    ///
    /// While a customisation session is open, a saved target lands in the
    /// session's working bounds and is discarded by [`cancel`](Self::cancel).
    pub fn start_editing(&mut self, target: EditableTarget) -> Result<()> {
        self.ensure_unlocked()?;
        let current = side_map(self.state.get(), target.side())
            .get(&target.nutrient())
            .copied()
            .or_else(|| self.calculation.as_ref().map(|c| target.system_default(c)));

        let seed = current.map(|v| format!("{}", v)).unwrap_or_default();
        self.editing_values.insert(target, seed);
        Ok(())
    }

    /// Update the in-progress value and validate it. Returns whether it is valid.
    pub fn set_editing_value(&mut self, target: EditableTarget, raw: &str) -> Result<bool> {
        self.ensure_unlocked()?;
        self.editing_values.insert(target, raw.to_string());
        Ok(self.validate_target(target, raw))
    }

    /// Drop the in-progress value and its error without touching the bounds.
    pub fn cancel_editing(&mut self, target: EditableTarget) {
        self.editing_values.remove(&target);
        if self.validation_errors().contains_key(&ErrorKey::Target(target)) {
            self.state
                .make_mut()
                .validation_errors
                .remove(&ErrorKey::Target(target));
        }
    }

    /// Replace the in-progress value with the computed default.
    pub fn reset_to_system_default(&mut self, target: EditableTarget) -> Result<()> {
        self.ensure_unlocked()?;
        let calculation = self.calculation.as_ref().ok_or(PlannerError::NoCalculation)?;
        let default = target.system_default(calculation);
        let raw = format!("{}", default);
        self.editing_values.insert(target, raw.clone());
        self.validate_target(target, &raw);
        Ok(())
    }

    /// Write the in-progress value to its bound and recompute the custom flag.
    ///
    /// Returns `Ok(false)` when the value is invalid; the edit stays open.
    pub fn save_target(&mut self, target: EditableTarget) -> Result<bool> {
        self.ensure_unlocked()?;
        let raw = self.editing_values.get(&target).cloned().unwrap_or_default();
        if !self.validate_target(target, &raw) {
            return Ok(false);
        }
        let Some(value) = parse_amount(&raw) else {
            return Ok(false);
        };

        let state = self.state.make_mut();
        side_map_mut(state, target.side()).insert(target.nutrient(), value);
        let changed = self.bounds_changed(self.lower_bounds(), self.upper_bounds());
        self.state.make_mut().use_custom = changed;
        self.editing_values.remove(&target);

        debug!(editor = %target, value, use_custom = changed, "target saved");
        Ok(true)
    }

    fn validate_target(&mut self, target: EditableTarget, raw: &str) -> bool {
        let error = match parse_amount(raw) {
            None => Some(MSG_NOT_A_NUMBER.to_string()),
            Some(v) if v < 0.0 => Some(MSG_NOT_A_NUMBER.to_string()),
            Some(v) => self.calculation.as_ref().and_then(|calc| match target {
                EditableTarget::Fibre if v > calc.carbohydrate => Some(format!(
                    "Cannot exceed Carbohydrates ({}g)",
                    format_amount(calc.carbohydrate)
                )),
                EditableTarget::SaturatedFats if v > calc.saturated_fats => Some(format!(
                    "Cannot exceed calculated target ({}g)",
                    format_amount(calc.saturated_fats)
                )),
                _ => None,
            }),
        };

        let key = ErrorKey::Target(target);
        let valid = error.is_none();
        let unchanged = self.validation_errors().get(&key) == error.as_ref();
        if !unchanged {
            let errors = &mut self.state.make_mut().validation_errors;
            match error {
                Some(message) => {
                    errors.insert(key, message);
                }
                None => {
                    errors.remove(&key);
                }
            }
        }
        valid
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Defaults and outputs
    // ─────────────────────────────────────────────────────────────────────────

    /// Computed defaults with fibre as a lower bound and saturated fat as an upper bound.
    pub fn canonical_defaults(&self) -> Option<(NutrientMap, NutrientMap)> {
        self.calculation.as_ref().map(canonical_defaults)
    }

    /// Whether any bound differs from the computed defaults, including bounds
    /// present on only one side of the comparison.
    pub fn bounds_changed(&self, lower: &NutrientMap, upper: &NutrientMap) -> bool {
        let (default_lower, default_upper) = self.canonical_defaults().unwrap_or_default();
        maps_differ(lower, &default_lower) || maps_differ(upper, &default_upper)
    }

    /// Committed bounds for persistence.
    pub fn saved_bounds(&self) -> SavedBounds {
        SavedBounds {
            use_custom_bounds: self.use_custom(),
            adjusted_lower_bounds: self.lower_bounds().clone(),
            adjusted_upper_bounds: self.upper_bounds().clone(),
        }
    }

    /// Bounds to send with an optimisation request.
    pub fn nutrient_goals(&self) -> NutrientGoals {
        NutrientGoals {
            lower_bounds: self.lower_bounds().clone(),
            upper_bounds: self.upper_bounds().clone(),
        }
    }
}

fn canonical_defaults(calculation: &NutritionCalculationResponse) -> (NutrientMap, NutrientMap) {
    let mut lower = calculation.lower_bounds.clone();
    let mut upper = calculation.upper_bounds.clone();
    lower.insert(Nutrient::Fibre, calculation.fibre);
    upper.insert(Nutrient::SaturatedFats, calculation.saturated_fats);
    (lower, upper)
}

fn maps_differ(current: &NutrientMap, defaults: &NutrientMap) -> bool {
    let keys: BTreeSet<&Nutrient> = current.keys().chain(defaults.keys()).collect();
    keys.into_iter()
        .any(|k| current.get(k) != defaults.get(k))
}

/// Check the pair for `nutrient` after `edited` changed.
fn validate_bound(state: &mut BoundsState, nutrient: Nutrient, edited: BoundSide) {
    let lower_key = ErrorKey::Bound(nutrient, BoundSide::Lower);
    let upper_key = ErrorKey::Bound(nutrient, BoundSide::Upper);
    state.validation_errors.remove(&lower_key);
    state.validation_errors.remove(&upper_key);

    let lower = state.lower.get(&nutrient).copied();
    let upper = state.upper.get(&nutrient).copied();

    match (lower, upper) {
        (None, None) => {
            state.validation_errors.insert(lower_key, MSG_BOUND_REQUIRED.to_string());
            state.validation_errors.insert(upper_key, MSG_BOUND_REQUIRED.to_string());
        }
        (Some(lo), Some(hi)) if lo > hi => {
            let (key, message) = match edited {
                BoundSide::Lower => (lower_key, MSG_LOWER_EXCEEDS),
                BoundSide::Upper => (upper_key, MSG_UPPER_BELOW),
            };
            state.validation_errors.insert(key, message.to_string());
        }
        _ => {}
    }
}
