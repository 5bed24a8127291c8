pub mod prompts;
pub mod render;

pub use prompts::{
    parse_split, prompt_bound_edit, prompt_nutrient, prompt_target_edit, prompt_yes_no,
    run_bounds_session, run_macro_editor,
};
pub use render::{
    display_bounds, display_food_list, display_macro_split, display_results,
    display_validation_errors,
};
