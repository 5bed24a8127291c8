mod bounds;
mod csv_io;
mod persistence;
mod selection;
mod transaction;

pub use bounds::{
    BoundSide, BoundsState, EditableTarget, ErrorKey, NutrientBoundsStore, SavedBounds,
    ValidationErrors,
};
pub use csv_io::{
    CsvParseResult, export_results_to_csv, export_selected_foods_to_csv, process_csv_data,
};
pub use persistence::{FileStore, MemoryStore, StateSlice, StateStore, load_slice, save_slice};
pub use selection::FoodSelection;
pub use transaction::Transaction;
