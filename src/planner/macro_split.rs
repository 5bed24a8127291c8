use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::models::MacroRatios;
use crate::planner::constants::*;

/// Protein/carbohydrate percentages; fat is always the remainder.
///
/// Shares are whole percentages so the three always sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMacroSplit")]
pub struct MacroSplit {
    protein: u8,
    carbs: u8,
}

#[derive(Deserialize)]
struct RawMacroSplit {
    protein: u8,
    carbs: u8,
}

impl TryFrom<RawMacroSplit> for MacroSplit {
    type Error = PlannerError;

    fn try_from(raw: RawMacroSplit) -> Result<Self> {
        MacroSplit::new(raw.protein, raw.carbs)
    }
}

impl MacroSplit {
    pub fn new(protein: u8, carbs: u8) -> Result<Self> {
        if protein as u16 + carbs as u16 > 100 {
            return Err(PlannerError::InvalidMacroSplit { protein, carbs });
        }
        Ok(Self { protein, carbs })
    }

    pub fn protein(&self) -> u8 {
        self.protein
    }

    pub fn carbs(&self) -> u8 {
        self.carbs
    }

    pub fn fat(&self) -> u8 {
        100 - self.protein - self.carbs
    }

    pub fn to_ratios(&self) -> MacroRatios {
        MacroRatios {
            protein: self.protein,
            carbohydrate: self.carbs,
            fats: self.fat(),
        }
    }

    /// Build from shares already known to lie in `0..=100` with `protein + carbs <= 100`.
    fn from_shares(protein: i32, carbs: i32) -> Self {
        let protein = protein.clamp(0, 100);
        let carbs = carbs.clamp(0, 100 - protein);
        Self {
            protein: protein as u8,
            carbs: carbs as u8,
        }
    }
}

impl Default for MacroSplit {
    fn default() -> Self {
        Self {
            protein: DEFAULT_PROTEIN_PCT,
            carbs: DEFAULT_CARBS_PCT,
        }
    }
}

/// Which boundary of the three-segment bar is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum DragMode {
    /// The protein|carbs boundary; fat stays fixed.
    ProteinCarb,
    /// The carbs|fat boundary; protein stays fixed.
    CarbFat,
}

/// Arrow-key input on a boundary handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStep {
    Decrease,
    Increase,
}

impl KeyStep {
    fn delta(self) -> i32 {
        match self {
            KeyStep::Decrease => -MACRO_STEP,
            KeyStep::Increase => MACRO_STEP,
        }
    }
}

/// Guideline ranges per macronutrient, inclusive, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmdrRanges {
    pub protein: (i32, i32),
    pub carbs: (i32, i32),
    pub fat: (i32, i32),
}

impl Default for AmdrRanges {
    fn default() -> Self {
        Self {
            protein: AMDR_PROTEIN,
            carbs: AMDR_CARBS,
            fat: AMDR_FAT,
        }
    }
}

/// Resolve an intent percentage into a new split.
///
/// `intent` is the absolute bar position of the moving boundary: the protein
/// share for [`DragMode::ProteinCarb`], protein + carbs for [`DragMode::CarbFat`].
pub fn resolve_intent(mode: DragMode, intent: i32, split: MacroSplit) -> MacroSplit {
    let protein = split.protein as i32;
    let carbs = split.carbs as i32;
    let fat = 100 - protein - carbs;

    match mode {
        DragMode::ProteinCarb => {
            let available = 100 - fat;
            let new_protein = intent.clamp(0, available);
            MacroSplit::from_shares(new_protein, available - new_protein)
        }
        DragMode::CarbFat => {
            let protein_plus_carbs = intent.clamp(protein, 100);
            MacroSplit::from_shares(protein, protein_plus_carbs - protein)
        }
    }
}

/// [`resolve_intent`] followed by guideline clamping.
///
/// The moved share is clamped to its own range first, then the complementary
/// share to its range. When the second clamp fires it wins, so the moved share
/// can end up outside its range; e.g. with fat at 60%, protein is pushed to 0%
/// to keep carbs at their 40% minimum. The ordering is deliberate and tested.
pub fn resolve_intent_guided(
    mode: DragMode,
    intent: i32,
    split: MacroSplit,
    ranges: &AmdrRanges,
) -> MacroSplit {
    let protein = split.protein as i32;

    match mode {
        DragMode::ProteinCarb => {
            let available = 100 - split.fat() as i32;
            let raw = resolve_intent(mode, intent, split);

            let mut new_protein = (raw.protein as i32).clamp(ranges.protein.0, ranges.protein.1);
            let mut new_carbs = available - new_protein;

            if new_carbs < ranges.carbs.0 {
                new_carbs = ranges.carbs.0;
                new_protein = available - new_carbs;
            }
            if new_carbs > ranges.carbs.1 {
                new_carbs = ranges.carbs.1;
                new_protein = available - new_carbs;
            }

            let new_protein = new_protein.clamp(0, available);
            MacroSplit::from_shares(new_protein, available - new_protein)
        }
        DragMode::CarbFat => {
            let available = 100 - protein;
            let raw = resolve_intent(mode, intent, split);

            let mut new_carbs = (raw.carbs as i32).clamp(ranges.carbs.0, ranges.carbs.1);
            let mut new_fat = available - new_carbs;

            if new_fat < ranges.fat.0 {
                new_fat = ranges.fat.0;
                new_carbs = available - new_fat;
            }
            if new_fat > ranges.fat.1 {
                new_fat = ranges.fat.1;
                new_carbs = available - new_fat;
            }

            MacroSplit::from_shares(protein, new_carbs.clamp(0, available))
        }
    }
}

/// Snap a percentage to the nearest multiple of [`MACRO_STEP`].
pub fn quantize(percent: f64) -> i32 {
    let step = MACRO_STEP as f64;
    ((percent / step).round() * step) as i32
}

/// Convert a pointer x-coordinate on the bar into a quantized intent.
pub fn pointer_to_intent(pointer_x: f64, track_left: f64, track_width: f64) -> i32 {
    if !(track_width > 0.0) || !pointer_x.is_finite() {
        return 0;
    }
    let raw = (pointer_x - track_left) / track_width * 100.0;
    quantize(raw.clamp(0.0, 100.0))
}

/// Entry point shared by drag and keyboard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroSplitSolver {
    ranges: Option<AmdrRanges>,
}

impl MacroSplitSolver {
    /// Unconstrained solver used by the results editor.
    pub fn plain() -> Self {
        Self { ranges: None }
    }

    /// Solver that applies guideline ranges, used during onboarding.
    pub fn guided(ranges: AmdrRanges) -> Self {
        Self {
            ranges: Some(ranges),
        }
    }

    pub fn ranges(&self) -> Option<&AmdrRanges> {
        self.ranges.as_ref()
    }

    pub fn resolve(&self, mode: DragMode, intent: i32, split: MacroSplit) -> MacroSplit {
        match &self.ranges {
            Some(ranges) => resolve_intent_guided(mode, intent, split, ranges),
            None => resolve_intent(mode, intent, split),
        }
    }

    /// Apply one arrow-key step to the given boundary.
    pub fn step(&self, mode: DragMode, split: MacroSplit, key: KeyStep) -> MacroSplit {
        let current = match mode {
            DragMode::ProteinCarb => split.protein as i32,
            DragMode::CarbFat => split.protein as i32 + split.carbs as i32,
        };
        self.resolve(mode, current + key.delta(), split)
    }
}

#[derive(Debug, Clone, Copy)]
struct DragGesture {
    mode: DragMode,
    origin: MacroSplit,
    current: MacroSplit,
}

/// Tracks a single pointer drag on the macro bar.
///
/// At most one gesture is active; a release off the track or a cancel
/// restores the split the gesture started from.
#[derive(Debug, Default)]
pub struct DragController {
    solver: MacroSplitSolver,
    active: Option<DragGesture>,
}

impl DragController {
    pub fn new(solver: MacroSplitSolver) -> Self {
        Self {
            solver,
            active: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Start a gesture. Returns false (and changes nothing) if one is active.
    pub fn begin(&mut self, mode: DragMode, split: MacroSplit) -> bool {
        if self.active.is_some() {
            debug!(?mode, "ignoring pointer-down during active drag");
            return false;
        }
        debug!(?mode, protein = split.protein, carbs = split.carbs, "drag started");
        self.active = Some(DragGesture {
            mode,
            origin: split,
            current: split,
        });
        true
    }

    /// Feed a pointer position; returns the live split.
    pub fn update(&mut self, pointer_x: f64, track_left: f64, track_width: f64) -> Option<MacroSplit> {
        let gesture = self.active.as_mut()?;
        let intent = pointer_to_intent(pointer_x, track_left, track_width);
        gesture.current = self.solver.resolve(gesture.mode, intent, gesture.origin);
        Some(gesture.current)
    }

    /// End the gesture. Released on the track keeps the live split;
    /// released off the track reverts to the starting split.
    pub fn finish(&mut self, on_track: bool) -> Option<MacroSplit> {
        let gesture = self.active.take()?;
        let result = if on_track {
            gesture.current
        } else {
            gesture.origin
        };
        debug!(on_track, protein = result.protein, carbs = result.carbs, "drag finished");
        Some(result)
    }

    /// Abort the gesture (pointer cancel, navigation) and return the starting split.
    pub fn cancel(&mut self) -> Option<MacroSplit> {
        self.active.take().map(|g| g.origin)
    }
}

/// Describe every share outside its guideline range.
pub fn amdr_violations(split: MacroSplit, ranges: &AmdrRanges) -> Vec<String> {
    let shares = [
        ("protein", split.protein() as i32, ranges.protein),
        ("carbohydrate", split.carbs() as i32, ranges.carbs),
        ("fats", split.fat() as i32, ranges.fat),
    ];

    shares
        .iter()
        .filter_map(|(name, value, (min, max))| {
            if value < min {
                Some(format!("{} is below minimum ({}%)", name, min))
            } else if value > max {
                Some(format!("{} exceeds maximum ({}%)", name, max))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(protein: u8, carbs: u8) -> MacroSplit {
        MacroSplit::new(protein, carbs).unwrap()
    }

    #[test]
    fn test_new_rejects_overflow() {
        assert!(MacroSplit::new(60, 41).is_err());
        assert_eq!(split(60, 40).fat(), 0);
    }

    #[test]
    fn test_protein_carb_keeps_fat() {
        let result = resolve_intent(DragMode::ProteinCarb, 20, split(30, 45));
        assert_eq!((result.protein(), result.carbs(), result.fat()), (20, 55, 25));

        // Clamped to the space left by fat
        let result = resolve_intent(DragMode::ProteinCarb, 90, split(30, 45));
        assert_eq!((result.protein(), result.carbs(), result.fat()), (75, 0, 25));

        let result = resolve_intent(DragMode::ProteinCarb, -10, split(30, 45));
        assert_eq!((result.protein(), result.carbs(), result.fat()), (0, 75, 25));
    }

    #[test]
    fn test_carb_fat_keeps_protein() {
        let result = resolve_intent(DragMode::CarbFat, 60, split(30, 45));
        assert_eq!((result.protein(), result.carbs(), result.fat()), (30, 30, 40));

        // Boundary cannot cross the protein boundary
        let result = resolve_intent(DragMode::CarbFat, 10, split(30, 45));
        assert_eq!((result.protein(), result.carbs(), result.fat()), (30, 0, 70));

        let result = resolve_intent(DragMode::CarbFat, 120, split(30, 45));
        assert_eq!((result.protein(), result.carbs(), result.fat()), (30, 70, 0));
    }

    #[test]
    fn test_guided_clamps_moved_share() {
        let ranges = AmdrRanges::default();
        let result = resolve_intent_guided(DragMode::ProteinCarb, 5, split(30, 45), &ranges);
        assert_eq!((result.protein(), result.carbs()), (10, 65));

        let result = resolve_intent_guided(DragMode::CarbFat, 95, split(30, 45), &ranges);
        // carbs clamp to 65 would leave fat at 5; fat minimum wins
        assert_eq!((result.protein(), result.carbs(), result.fat()), (30, 50, 20));
    }

    #[test]
    fn test_guided_secondary_range_overrides_primary() {
        let ranges = AmdrRanges::default();
        // Fat at 60% leaves 40% for protein + carbs; carbs minimum takes all of it.
        let result = resolve_intent_guided(DragMode::ProteinCarb, 20, split(20, 20), &ranges);
        assert_eq!((result.protein(), result.carbs(), result.fat()), (0, 40, 60));
        assert!(!amdr_violations(result, &ranges).is_empty());

        // Protein at 50% leaves 50%; fat minimum pushes carbs below 40.
        let result = resolve_intent_guided(DragMode::CarbFat, 95, split(50, 40), &ranges);
        assert_eq!((result.protein(), result.carbs(), result.fat()), (50, 30, 20));
    }

    #[test]
    fn test_keyboard_steps() {
        let solver = MacroSplitSolver::plain();
        let start = split(30, 45);

        let result = solver.step(DragMode::ProteinCarb, start, KeyStep::Increase);
        assert_eq!((result.protein(), result.carbs(), result.fat()), (35, 40, 25));

        let result = solver.step(DragMode::CarbFat, start, KeyStep::Decrease);
        assert_eq!((result.protein(), result.carbs(), result.fat()), (30, 40, 30));
    }

    #[test]
    fn test_keyboard_and_pointer_agree() {
        let solver = MacroSplitSolver::guided(AmdrRanges::default());
        let start = split(30, 45);

        let by_key = solver.step(DragMode::CarbFat, start, KeyStep::Increase);
        let by_pointer = solver.resolve(
            DragMode::CarbFat,
            pointer_to_intent(80.0, 0.0, 100.0),
            start,
        );
        assert_eq!(by_key, by_pointer);
    }

    #[test]
    fn test_pointer_to_intent_quantizes() {
        assert_eq!(pointer_to_intent(133.0, 100.0, 200.0), 15);
        assert_eq!(pointer_to_intent(50.0, 100.0, 200.0), 0);
        assert_eq!(pointer_to_intent(400.0, 100.0, 200.0), 100);
        assert_eq!(pointer_to_intent(10.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_drag_single_gesture() {
        let mut drag = DragController::new(MacroSplitSolver::plain());
        let start = split(30, 45);

        assert!(drag.begin(DragMode::ProteinCarb, start));
        assert!(!drag.begin(DragMode::CarbFat, start));

        let live = drag.update(20.0, 0.0, 100.0).unwrap();
        assert_eq!(live.protein(), 20);
        assert_eq!(drag.finish(true), Some(live));
        assert!(!drag.is_dragging());
        assert_eq!(drag.update(50.0, 0.0, 100.0), None);
    }

    #[test]
    fn test_drag_off_track_reverts() {
        let mut drag = DragController::new(MacroSplitSolver::plain());
        let start = split(30, 45);

        drag.begin(DragMode::CarbFat, start);
        drag.update(90.0, 0.0, 100.0);
        assert_eq!(drag.finish(false), Some(start));

        drag.begin(DragMode::CarbFat, start);
        drag.update(90.0, 0.0, 100.0);
        assert_eq!(drag.cancel(), Some(start));
    }

    #[test]
    fn test_amdr_violations() {
        let ranges = AmdrRanges::default();
        assert!(amdr_violations(split(30, 45), &ranges).is_empty());

        let violations = amdr_violations(split(5, 70), &ranges);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("protein is below minimum"));
        assert!(violations[1].contains("carbohydrate exceeds maximum"));
    }

    #[test]
    fn test_deserialize_validates_sum() {
        let ok: MacroSplit = serde_json::from_str(r#"{"protein": 25, "carbs": 50}"#).unwrap();
        assert_eq!(ok.fat(), 25);
        assert!(serde_json::from_str::<MacroSplit>(r#"{"protein": 70, "carbs": 50}"#).is_err());
    }
}
