use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid macro split: protein {protein}% + carbs {carbs}% exceeds 100%")]
    InvalidMacroSplit { protein: u8, carbs: u8 },

    #[error("Unknown nutrient: {0}")]
    UnknownNutrient(String),

    #[error("No nutrition calculation loaded")]
    NoCalculation,

    #[error("Bounds are not being customised")]
    NotCustomising,

    #[error("A customisation session is already open")]
    SessionAlreadyOpen,

    #[error("Editing is disabled while a request is in flight")]
    Locked,
}

pub type Result<T> = std::result::Result<T, PlannerError>;
