/// Percentage step for keyboard input and drag quantization.
pub const MACRO_STEP: i32 = 5;

/// Default macro split used when the form starts (fat is the remainder).
pub const DEFAULT_PROTEIN_PCT: u8 = 30;
pub const DEFAULT_CARBS_PCT: u8 = 45;

/// Acceptable Macronutrient Distribution Ranges, in percent of energy.
pub const AMDR_PROTEIN: (i32, i32) = (10, 40);
pub const AMDR_CARBS: (i32, i32) = (40, 65);
pub const AMDR_FAT: (i32, i32) = (20, 35);

/// Serving size assumed when a food has none.
pub const DEFAULT_SERVING_SIZE_G: f64 = 100.0;

// ─────────────────────────────────────────────────────────────────────────────
// Rounding
// ─────────────────────────────────────────────────────────────────────────────

/// Decimal places for serving counts.
pub const SERVINGS_DECIMALS: u32 = 1;

/// Decimal places for gram amounts in tables and exports.
pub const GRAMS_DECIMALS: u32 = 1;

/// Decimal places for currency.
pub const CURRENCY_DECIMALS: u32 = 2;

/// Decimal places for nutrient values written to CSV.
pub const CSV_NUTRIENT_DECIMALS: usize = 2;

/// Tolerance for detecting an exact half after scaling.
pub const HALF_EPSILON: f64 = 1e-8;
