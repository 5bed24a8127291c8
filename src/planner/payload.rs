use crate::models::{FoodItem, NutrientGoals, OptimisationRequestPayload, SelectedFoodPayload, UserInfo};

/// Build the optimizer request from the selected foods and committed goals.
///
/// The optimizer works in servings, so nutrient profiles are scaled from
/// per 100 g to per serving.
pub fn prepare_optimisation_payload(
    foods: &[FoodItem],
    goals: &NutrientGoals,
    user: &UserInfo,
) -> OptimisationRequestPayload {
    let selected_foods = foods
        .iter()
        .map(|food| {
            let serving_size = food.serving_size_g();
            SelectedFoodPayload {
                fdc_id: food.fdc_id.clone(),
                description: food.description.clone(),
                price: food.price_per_serving(),
                serving_size,
                max_serving: food.max_serving_g(),
                requires_integer_servings: food.integer_servings,
                must_include: food.must_include,
                nutrients: food.nutrients_per_serving(),
            }
        })
        .collect();

    OptimisationRequestPayload {
        selected_foods,
        nutrient_goals: goals.clone(),
        age: user.age,
        gender: user.gender.code().to_string(),
        smoking_status: if user.smoking { "yes" } else { "no" }.to_string(),
    }
}
