use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::models::{FoodItem, Nutrient, NutrientMap};
use crate::planner::constants::{
    CSV_NUTRIENT_DECIMALS, CURRENCY_DECIMALS, DEFAULT_SERVING_SIZE_G, GRAMS_DECIMALS,
    SERVINGS_DECIMALS,
};
use crate::planner::{ConsistentResults, bankers_round};

const COL_DISCRETE: &str = "Discrete Servings";
const COL_MUST_INCLUDE: &str = "Must Include";
const COL_FOOD: &str = "Food Item";
const COL_PRICE: &str = "Price Per Serving";
const COL_SERVING_SIZE: &str = "Serving Size (g)";
const COL_MAX_SERVING: &str = "Max Serving (g)";
const COL_FDC_ID: &str = "FDC ID";

const MSG_PARSE_ERROR: &str = "Error parsing CSV file. Please ensure the file format is correct.";
const MSG_MISSING_FOOD: &str = "Invalid CSV format! Please ensure your file matches the format of a CSV exported from the 'Selected Foods' section.";

/// Outcome of importing a selected-foods CSV.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvParseResult {
    Success(Vec<FoodItem>),
    Failure(String),
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| PlannerError::InvalidInput(e.to_string()))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the selected foods in the import format, nutrients per serving at 2dp.
pub fn export_selected_foods_to_csv(foods: &[FoodItem]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers = vec![
        COL_DISCRETE,
        COL_MUST_INCLUDE,
        COL_FOOD,
        COL_PRICE,
        COL_SERVING_SIZE,
        COL_MAX_SERVING,
    ];
    headers.extend(Nutrient::ALL.iter().map(|n| n.csv_header()));
    writer.write_record(&headers)?;

    for food in foods {
        let per_serving = food.nutrients_per_serving();
        let mut record = vec![
            yes_no(food.integer_servings).to_string(),
            yes_no(food.must_include).to_string(),
            food.description.clone(),
            optional_number(food.price),
            optional_number(food.serving_size),
            optional_number(food.max_serving),
        ];
        record.extend(Nutrient::ALL.iter().map(|n| {
            per_serving
                .get(n)
                .map(|v| format!("{:.*}", CSV_NUTRIENT_DECIMALS, v))
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    debug!(rows = foods.len(), "selected foods exported");
    finish(writer)
}

/// Parse a non-empty cell as a finite number.
fn parse_cell(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

struct CsvRow<'a> {
    cells: HashMap<&'a str, &'a str>,
}

impl<'a> CsvRow<'a> {
    fn get(&self, column: &str) -> Option<&'a str> {
        self.cells.get(column).copied()
    }

    /// First column among `columns` that has a non-empty value.
    fn first_present(&self, columns: &[&str]) -> Option<&'a str> {
        columns
            .iter()
            .filter_map(|c| self.get(c))
            .find(|v| !v.trim().is_empty())
    }

    fn flag(&self, column: &str) -> bool {
        self.get(column).map(|v| v.trim() == "Yes").unwrap_or(false)
    }
}

/// Import a selected-foods CSV.
///
/// Nutrient columns hold per-serving amounts and are normalised to per 100 g.
/// Legacy header spellings are accepted. Rows without a food name are skipped.
pub fn process_csv_data(input: &str) -> CsvParseResult {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!(error = %e, "unreadable CSV header");
            return CsvParseResult::Failure(MSG_PARSE_ERROR.to_string());
        }
    };

    let mut records = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(error = %e, "malformed CSV record");
                return CsvParseResult::Failure(MSG_PARSE_ERROR.to_string());
            }
        }
    }

    let mut foods = Vec::new();
    for (line, record) in records.iter().enumerate() {
        let row = CsvRow {
            cells: headers.iter().zip(record.iter()).collect(),
        };

        let Some(description) = row.get(COL_FOOD).filter(|d| !d.is_empty()) else {
            warn!(row = line + 1, "skipping CSV row without a food name");
            continue;
        };

        let serving_size = parse_cell(row.get(COL_SERVING_SIZE))
            .filter(|s| *s != 0.0)
            .unwrap_or(DEFAULT_SERVING_SIZE_G);

        let mut nutrients = NutrientMap::new();
        for nutrient in Nutrient::ALL {
            let mut columns = vec![nutrient.csv_header()];
            columns.extend_from_slice(nutrient.csv_aliases());
            if let Some(amount) = parse_cell(row.first_present(&columns)) {
                nutrients.insert(nutrient, amount * 100.0 / serving_size);
            }
        }

        let fdc_id = row
            .get(COL_FDC_ID)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("imported-{}", foods.len()));

        foods.push(FoodItem {
            price: parse_cell(row.get(COL_PRICE)),
            serving_size: Some(serving_size),
            max_serving: parse_cell(row.get(COL_MAX_SERVING)),
            integer_servings: row.flag(COL_DISCRETE),
            must_include: row.flag(COL_MUST_INCLUDE),
            ..FoodItem::new(fdc_id, description, nutrients)
        });
    }

    if !records.is_empty() && foods.is_empty() {
        warn!(rows = records.len(), "CSV has rows but no food names");
        return CsvParseResult::Failure(MSG_MISSING_FOOD.to_string());
    }

    debug!(foods = foods.len(), "CSV imported");
    CsvParseResult::Success(foods)
}

fn fixed(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, bankers_round(value, decimals))
}

/// Write the aggregated plan: one row per item plus a totals row.
pub fn export_results_to_csv(results: &ConsistentResults) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers = vec![
        COL_FOOD.to_string(),
        "Servings".to_string(),
        COL_SERVING_SIZE.to_string(),
        "Total Serving (g)".to_string(),
        "Cost".to_string(),
    ];
    headers.extend(Nutrient::ALL.iter().map(|n| n.key().to_string()));
    writer.write_record(&headers)?;

    let nutrient_cells = |nutrients: &NutrientMap| -> Vec<String> {
        Nutrient::ALL
            .iter()
            .map(|n| fixed(nutrients.get(n).copied().unwrap_or(0.0), CSV_NUTRIENT_DECIMALS as u32))
            .collect()
    };

    let mut total_grams = 0.0;
    for item in &results.items {
        total_grams += item.total_serving_grams;
        let mut record = vec![
            item.food.clone(),
            fixed(item.servings, SERVINGS_DECIMALS),
            item.serving_size.to_string(),
            fixed(item.total_serving_grams, GRAMS_DECIMALS),
            fixed(item.cost, CURRENCY_DECIMALS),
        ];
        record.extend(nutrient_cells(&item.nutrients));
        writer.write_record(&record)?;
    }

    let mut totals = vec![
        "Total".to_string(),
        String::new(),
        String::new(),
        fixed(total_grams, GRAMS_DECIMALS),
        fixed(results.totals.cost, CURRENCY_DECIMALS),
    ];
    totals.extend(nutrient_cells(&results.totals.nutrients));
    writer.write_record(&totals)?;

    finish(writer)
}
