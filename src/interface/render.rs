use std::collections::BTreeMap;

use crate::models::{FoodItem, Nutrient};
use crate::planner::constants::{CURRENCY_DECIMALS, GRAMS_DECIMALS, SERVINGS_DECIMALS};
use crate::planner::{
    AmdrRanges, ConsistentResults, MacroSplit, NutrientRow, SortConfig, SortKey, amdr_violations,
    bankers_round,
};
use crate::state::{BoundSide, EditableTarget, ErrorKey, NutrientBoundsStore};

const BAR_WIDTH: usize = 40;

/// Display the macro split as a three-segment bar with percentages.
pub fn display_macro_split(split: &MacroSplit, ranges: Option<&AmdrRanges>) {
    let protein_cells = split.protein() as usize * BAR_WIDTH / 100;
    let carb_cells = (split.protein() as usize + split.carbs() as usize) * BAR_WIDTH / 100 - protein_cells;
    let fat_cells = BAR_WIDTH - protein_cells - carb_cells;

    println!();
    println!(
        "[{}{}{}]",
        "P".repeat(protein_cells),
        "C".repeat(carb_cells),
        "F".repeat(fat_cells)
    );
    println!(
        "Protein {}% | Carbohydrates {}% | Fats {}%",
        split.protein(),
        split.carbs(),
        split.fat()
    );

    if let Some(ranges) = ranges {
        for violation in amdr_violations(*split, ranges) {
            println!("  ! {}", violation);
        }
    }
}

fn format_bound(value: Option<f64>) -> String {
    value.map(|v| format!("{}", v)).unwrap_or_else(|| "-".to_string())
}

/// Display current bounds, targets, and any validation messages.
pub fn display_bounds(store: &NutrientBoundsStore) {
    let lower = store.lower_bounds();
    let upper = store.upper_bounds();

    println!();
    if store.is_customising() {
        println!("=== Nutrient Bounds (editing) ===");
    } else if store.use_custom() {
        println!("=== Nutrient Bounds (custom) ===");
    } else {
        println!("=== Nutrient Bounds ===");
    }
    println!();

    for target in EditableTarget::ALL {
        let nutrient = target.nutrient();
        let value = match target.side() {
            BoundSide::Lower => lower.get(&nutrient),
            BoundSide::Upper => upper.get(&nutrient),
        };
        println!(
            "  {:<16} {} {} {}",
            target.name(),
            target.direction(),
            format_bound(value.copied()),
            nutrient.unit()
        );
    }
    println!();

    let name_width = Nutrient::ALL.iter().map(|n| n.name().len()).max().unwrap_or(10);
    for nutrient in Nutrient::ALL {
        println!(
            "  {:<width$} {:>10} - {:<10} {}",
            nutrient.name(),
            format_bound(lower.get(&nutrient).copied()),
            format_bound(upper.get(&nutrient).copied()),
            nutrient.unit(),
            width = name_width
        );
    }

    display_validation_errors(store.validation_errors());
}

pub fn display_validation_errors(errors: &BTreeMap<ErrorKey, String>) {
    if errors.is_empty() {
        return;
    }
    println!();
    for (key, message) in errors {
        println!("  ! {}: {}", key, message);
    }
}

fn header(label: &str, key: SortKey, sort: &SortConfig<SortKey>) -> String {
    format!("{}{}", label, sort.sort_icon(key).unwrap_or(""))
}

/// Display the portions table, totals, and daily nutrient totals.
pub fn display_results(
    results: &ConsistentResults,
    sort: &SortConfig<SortKey>,
    rows: &[NutrientRow],
    overflow: Option<(&BTreeMap<String, f64>, f64)>,
) {
    if results.items.is_empty() {
        println!("No foods in the optimised plan.");
        return;
    }

    let name_width = results
        .items
        .iter()
        .map(|i| i.food.len())
        .max()
        .unwrap_or(10)
        .max(10);

    println!();
    println!("=== Optimised Plan ===");
    println!();
    println!(
        "{:<width$}  {:>16}  {:>10}  {:>18}  {:>10}",
        header("Food", SortKey::Food, sort),
        header("Serving Size (g)", SortKey::ServingSize, sort),
        header("Servings", SortKey::Servings, sort),
        header("Total Serving (g)", SortKey::TotalServing, sort),
        header("Cost", SortKey::Cost, sort),
        width = name_width
    );

    for item in &results.items {
        println!(
            "{:<width$}  {:>16}  {:>10.prec$}  {:>18.grams$}  {:>10.cur$}",
            item.food,
            item.serving_size,
            item.servings,
            bankers_round(item.total_serving_grams, GRAMS_DECIMALS),
            item.cost,
            width = name_width,
            prec = SERVINGS_DECIMALS as usize,
            grams = GRAMS_DECIMALS as usize,
            cur = CURRENCY_DECIMALS as usize
        );
    }

    println!();
    println!("Total cost: {:.*}", CURRENCY_DECIMALS as usize, results.totals.cost);
    println!();
    println!("--- Daily Nutrient Totals ---");
    for row in rows {
        println!(
            "  {:<32} {:>10.prec$} {}",
            row.name,
            row.value,
            row.unit,
            prec = row.nutrient.display_decimals() as usize
        );
    }

    if let Some((by_nutrient, total)) = overflow {
        if total > 0.0 {
            println!();
            println!("--- Overflow ---");
            for (nutrient, amount) in by_nutrient {
                println!("  {:<32} {:>10.2}", nutrient, amount);
            }
            println!("  Total overflow: {:.2}", total);
        }
    }
    println!();
}

/// Display a simple list of foods with their details.
pub fn display_food_list(foods: &[FoodItem], title: &str) {
    if foods.is_empty() {
        println!("{}: (none)", title);
        return;
    }

    println!();
    println!("=== {} ({} items) ===", title, foods.len());
    println!();

    for food in foods {
        let mut flags = Vec::new();
        if food.integer_servings {
            flags.push("discrete");
        }
        if food.must_include {
            flags.push("must include");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        println!(
            "  {} - {} g serving, {:.2} per serving{}",
            food.description,
            food.serving_size_g(),
            food.price_per_serving(),
            flags
        );
    }

    println!();
}
