use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::planner::{DragMode, SortKey};

/// Knapsnack: diet planner core for macro splits, nutrient bounds, and optimised results.
#[derive(Parser, Debug)]
#[command(name = "knapsnack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding persisted state.
    #[arg(short, long, global = true, default_value = ".knapsnack")]
    pub data_dir: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or adjust the protein/carbohydrate/fat split.
    Macros {
        /// Start from this split (PROTEIN/CARBS) instead of the saved one.
        #[arg(long)]
        split: Option<String>,

        /// Boundary to move for a one-shot adjustment.
        #[arg(long, value_enum, requires = "intent")]
        mode: Option<DragMode>,

        /// Absolute bar position (0-100) for the moved boundary.
        #[arg(long, requires = "mode", allow_hyphen_values = true)]
        intent: Option<i32>,

        /// Clamp shares to the recommended ranges.
        #[arg(long)]
        guided: bool,
    },

    /// Customise nutrient bounds interactively.
    Bounds {
        /// Calculator output JSON to seed defaults from.
        #[arg(short, long)]
        calculation: PathBuf,

        /// Discard saved custom bounds and start from defaults.
        #[arg(long)]
        reset: bool,
    },

    /// Aggregate an optimizer result against the selected foods.
    Results {
        /// Optimizer result JSON.
        #[arg(short, long)]
        result: PathBuf,

        /// Selected foods CSV (defaults to the saved selection).
        #[arg(short, long)]
        foods: Option<PathBuf>,

        /// Column to sort the portions table by.
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        #[arg(long, requires = "sort")]
        descending: bool,

        /// Write the aggregated table to this CSV file.
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Manage the selected foods list.
    Foods {
        #[command(subcommand)]
        action: FoodsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum FoodsAction {
    /// Import foods from CSV, merging into the selection.
    Import {
        path: PathBuf,

        /// Replace the selection instead of merging.
        #[arg(long)]
        replace: bool,
    },

    /// Export the selection to CSV.
    Export { path: PathBuf },

    /// List the selection.
    List,

    /// Remove a food by description.
    Remove { description: String },

    /// Clear all persisted state.
    Clear,
}
