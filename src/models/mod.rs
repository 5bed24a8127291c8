pub mod calculation;
pub mod food;
pub mod nutrient;

pub use calculation::{
    Gender, MacroRatios, NutrientGoals, NutritionCalculationResponse, OptimisationApiResult,
    OptimisationRequestPayload, SelectedFoodPayload, UserInfo,
};
pub use food::FoodItem;
pub use nutrient::{Nutrient, NutrientCategory, NutrientMap};
