pub mod constants;
pub mod macro_split;
pub mod payload;
pub mod results;
pub mod rounding;

pub use constants::*;
pub use macro_split::{
    AmdrRanges, DragController, DragMode, KeyStep, MacroSplit, MacroSplitSolver,
    amdr_violations, pointer_to_intent, quantize, resolve_intent, resolve_intent_guided,
};
pub use payload::prepare_optimisation_payload;
pub use results::{
    ConsistentResults, NutrientRow, NutrientSortKey, ResultItem, ResultTotals, SortConfig,
    SortDirection, SortKey, calculate_consistent_results, nutrient_rows, sort_items,
    sort_nutrient_rows,
};
pub use rounding::bankers_round;
