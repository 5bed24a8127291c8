use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::{debug, info};

use knapsnack_rs::cli::{Cli, Command, FoodsAction};
use knapsnack_rs::error::{PlannerError, Result};
use knapsnack_rs::interface::{
    display_food_list, display_macro_split, display_results, parse_split, prompt_yes_no,
    run_bounds_session, run_macro_editor,
};
use knapsnack_rs::models::{FoodItem, NutritionCalculationResponse, OptimisationApiResult, UserInfo};
use knapsnack_rs::planner::{
    AmdrRanges, DragMode, MacroSplit, MacroSplitSolver, SortConfig, SortDirection, SortKey,
    calculate_consistent_results, nutrient_rows, sort_items,
};
use knapsnack_rs::state::{
    CsvParseResult, FileStore, FoodSelection, NutrientBoundsStore, SavedBounds, StateSlice,
    StateStore, export_results_to_csv, export_selected_foods_to_csv, load_slice, process_csv_data,
    save_slice,
};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut store = FileStore::open(&cli.data_dir)?;
    debug!(dir = %store.dir().display(), "state directory opened");

    match cli.command {
        Command::Macros {
            split,
            mode,
            intent,
            guided,
        } => cmd_macros(&mut store, split.as_deref(), mode.zip(intent), guided),
        Command::Bounds { calculation, reset } => cmd_bounds(&mut store, &calculation, reset),
        Command::Results {
            result,
            foods,
            sort,
            descending,
            export,
        } => cmd_results(
            &mut store,
            &result,
            foods.as_deref(),
            sort,
            descending,
            export.as_deref(),
        ),
        Command::Foods { action } => cmd_foods(&mut store, action),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_selection(store: &FileStore) -> Result<FoodSelection> {
    let foods: Vec<FoodItem> = load_slice(store, StateSlice::SelectedFoods)?.unwrap_or_default();
    Ok(FoodSelection::new(foods))
}

fn import_csv(path: &Path) -> Result<Vec<FoodItem>> {
    let content = fs::read_to_string(path)?;
    match process_csv_data(&content) {
        CsvParseResult::Success(foods) => Ok(foods),
        CsvParseResult::Failure(message) => Err(PlannerError::InvalidInput(message)),
    }
}

/// Show the macro split, apply a one-shot move or run the keyboard editor, then save.
fn cmd_macros(
    store: &mut FileStore,
    split: Option<&str>,
    intent: Option<(DragMode, i32)>,
    guided: bool,
) -> Result<()> {
    let start = match split {
        Some(raw) => parse_split(raw)?,
        None => load_slice(&*store, StateSlice::MacroSplit)?.unwrap_or_default(),
    };

    let solver = if guided {
        MacroSplitSolver::guided(AmdrRanges::default())
    } else {
        MacroSplitSolver::plain()
    };

    let result = match intent {
        Some((mode, intent)) => {
            let result = solver.resolve(mode, intent, start);
            display_macro_split(&result, solver.ranges());
            result
        }
        None => run_macro_editor(&solver, start)?,
    };

    if result == start && split.is_none() {
        println!("Macro split unchanged.");
        return Ok(());
    }

    save_macro_split(store, result)?;
    println!(
        "Saved split: protein {}%, carbohydrates {}%, fats {}%",
        result.protein(),
        result.carbs(),
        result.fat()
    );
    Ok(())
}

fn save_macro_split(store: &mut FileStore, split: MacroSplit) -> Result<()> {
    save_slice(store, StateSlice::MacroSplit, &split)?;

    // Keep the calculator request in step with the bar.
    if let Some(mut user) = load_slice::<UserInfo, _>(&*store, StateSlice::UserInfo)? {
        user.macro_ratios = split.to_ratios();
        save_slice(store, StateSlice::UserInfo, &user)?;
    }
    Ok(())
}

/// Run a bounds session seeded from calculator output and persist the outcome.
fn cmd_bounds(store: &mut FileStore, calculation_path: &Path, reset: bool) -> Result<()> {
    let calculation: NutritionCalculationResponse = read_json(calculation_path)?;

    let saved = if reset {
        store.clear(StateSlice::CustomBounds)?;
        None
    } else {
        load_slice::<SavedBounds, _>(&*store, StateSlice::CustomBounds)?
    };

    let mut bounds = NutrientBoundsStore::with_saved(calculation, saved);
    let saved = run_bounds_session(&mut bounds)?;

    save_slice(store, StateSlice::CustomBounds, &bounds.saved_bounds())?;
    save_slice(store, StateSlice::NutrientGoals, &bounds.nutrient_goals())?;
    info!(saved, use_custom = bounds.use_custom(), "bounds persisted");
    Ok(())
}

/// Aggregate an optimizer result and display (and optionally export) it.
fn cmd_results(
    store: &mut FileStore,
    result_path: &Path,
    foods_path: Option<&Path>,
    sort: Option<SortKey>,
    descending: bool,
    export: Option<&Path>,
) -> Result<()> {
    let result: OptimisationApiResult = read_json(result_path)?;
    let foods = match foods_path {
        Some(path) => import_csv(path)?,
        None => load_selection(store)?.into_foods(),
    };

    if foods.is_empty() {
        println!("No selected foods. Use 'foods import' or pass --foods.");
        return Ok(());
    }

    let mut results = calculate_consistent_results(&result, &foods);

    let mut sort_config = SortConfig::default();
    if let Some(key) = sort {
        let direction = if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        sort_config = SortConfig::new(key, direction);
        results.items = sort_items(&results.items, &sort_config);
    }

    let rows = nutrient_rows(&results.totals);
    display_results(
        &results,
        &sort_config,
        &rows,
        Some((&result.overflow_by_nutrient, result.total_overflow)),
    );

    save_slice(store, StateSlice::OptimisationResults, &result)?;

    if let Some(path) = export {
        fs::write(path, export_results_to_csv(&results)?)?;
        println!("Results exported to {}", path.display());
    }
    Ok(())
}

fn cmd_foods(store: &mut FileStore, action: FoodsAction) -> Result<()> {
    match action {
        FoodsAction::Import { path, replace } => {
            let imported = import_csv(&path)?;
            let mut selection = if replace {
                FoodSelection::default()
            } else {
                load_selection(store)?
            };
            let count = selection.merge(imported);
            save_slice(store, StateSlice::SelectedFoods, selection.foods())?;
            println!("Imported {} foods ({} selected).", count, selection.len());
        }
        FoodsAction::Export { path } => {
            let selection = load_selection(store)?;
            fs::write(&path, export_selected_foods_to_csv(selection.foods())?)?;
            println!("Exported {} foods to {}", selection.len(), path.display());
        }
        FoodsAction::List => {
            let selection = load_selection(store)?;
            display_food_list(selection.foods(), "Selected Foods");
        }
        FoodsAction::Remove { description } => {
            let mut selection = load_selection(store)?;
            let removed = selection.remove(&description)?;
            save_slice(store, StateSlice::SelectedFoods, selection.foods())?;
            println!("Removed {}.", removed.description);
        }
        FoodsAction::Clear => {
            if prompt_yes_no("Clear all saved state?", false)? {
                store.clear_all()?;
                println!("State cleared.");
            }
        }
    }
    Ok(())
}
