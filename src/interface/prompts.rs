use dialoguer::{Confirm, Input, Select};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::interface::render::{display_bounds, display_macro_split, display_validation_errors};
use crate::models::Nutrient;
use crate::planner::{DragMode, KeyStep, MacroSplit, MacroSplitSolver};
use crate::state::{BoundSide, EditableTarget, NutrientBoundsStore};

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Prompt for a nutrient with fuzzy matching. Empty input returns `None`.
pub fn prompt_nutrient() -> Result<Option<Nutrient>> {
    loop {
        let input: String = Input::new()
            .with_prompt("Nutrient (or press Enter to go back)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let Some(nutrient) = Nutrient::find_closest(input) else {
            println!("No matching nutrient found for '{}'", input);
            continue;
        };

        if nutrient.name().eq_ignore_ascii_case(input) || nutrient.key().eq_ignore_ascii_case(input) {
            return Ok(Some(nutrient));
        }

        let confirm = Confirm::new()
            .with_prompt(format!("Did you mean '{}'?", nutrient.name()))
            .default(true)
            .interact()?;
        if confirm {
            return Ok(Some(nutrient));
        }
    }
}

fn prompt_raw(prompt: String, initial: String) -> Result<String> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(input)
}

fn format_current(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Edit both bounds of one nutrient inside an open session.
pub fn prompt_bound_edit(store: &mut NutrientBoundsStore, nutrient: Nutrient) -> Result<()> {
    for side in [BoundSide::Lower, BoundSide::Upper] {
        let current = match side {
            BoundSide::Lower => store.lower_bounds().get(&nutrient).copied(),
            BoundSide::Upper => store.upper_bounds().get(&nutrient).copied(),
        };
        let raw = prompt_raw(
            format!("{} {} bound ({}, empty to clear)", nutrient.name(), side.label(), nutrient.unit()),
            format_current(current),
        )?;
        store.handle_bound_change(nutrient, side, &raw)?;
    }
    Ok(())
}

/// Edit a single target until it is saved or abandoned.
pub fn prompt_target_edit(store: &mut NutrientBoundsStore, target: EditableTarget) -> Result<()> {
    store.start_editing(target)?;

    loop {
        let initial = store.editing_value(target).unwrap_or_default().to_string();
        let raw = prompt_raw(
            format!("{} target {} ({})", target.name(), target.direction(), target.nutrient().unit()),
            initial,
        )?;

        if store.set_editing_value(target, &raw)? && store.save_target(target)? {
            println!("{} target saved.", target.name());
            return Ok(());
        }

        display_validation_errors(store.validation_errors());
        let options = ["Try again", "Reset to system default", "Cancel"];
        let choice = Select::new()
            .with_prompt("Value not saved")
            .items(&options)
            .default(0)
            .interact()?;

        match choice {
            0 => {}
            1 => store.reset_to_system_default(target)?,
            _ => {
                store.cancel_editing(target);
                return Ok(());
            }
        }
    }
}

fn prompt_target() -> Result<Option<EditableTarget>> {
    let mut options: Vec<&str> = EditableTarget::ALL.iter().map(|t| t.name()).collect();
    options.push("Back");

    let choice = Select::new()
        .with_prompt("Which target?")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(EditableTarget::ALL.get(choice).copied())
}

/// Run an interactive customisation session. Returns whether it was saved.
pub fn run_bounds_session(store: &mut NutrientBoundsStore) -> Result<bool> {
    loop {
        display_bounds(store);

        let options = if store.is_customising() {
            vec![
                "Edit a nutrient",
                "Edit a target",
                "Reset to defaults",
                "Save",
                "Cancel",
            ]
        } else {
            vec!["Customise bounds", "Edit a target", "Done"]
        };

        let choice = Select::new()
            .with_prompt("Bounds")
            .items(&options)
            .default(0)
            .interact()?;

        match options[choice] {
            "Customise bounds" => store.start_customising()?,
            "Edit a nutrient" => {
                if let Some(nutrient) = prompt_nutrient()? {
                    prompt_bound_edit(store, nutrient)?;
                }
            }
            "Edit a target" => {
                if let Some(target) = prompt_target()? {
                    prompt_target_edit(store, target)?;
                }
            }
            "Reset to defaults" => store.reset_bounds()?,
            "Save" => {
                if store.save()? {
                    println!("Bounds saved.");
                    return Ok(true);
                }
                println!("Fix the highlighted bounds before saving.");
            }
            "Cancel" => {
                store.cancel()?;
                println!("Changes discarded.");
            }
            _ => return Ok(store.use_custom()),
        }
    }
}

/// Step the macro split with the keyboard until the user accepts or cancels.
///
/// Cancelling returns the split the editor started with.
pub fn run_macro_editor(solver: &MacroSplitSolver, start: MacroSplit) -> Result<MacroSplit> {
    let actions: [(&str, Option<(DragMode, KeyStep)>); 6] = [
        ("Protein -5", Some((DragMode::ProteinCarb, KeyStep::Decrease))),
        ("Protein +5", Some((DragMode::ProteinCarb, KeyStep::Increase))),
        ("Fats +5", Some((DragMode::CarbFat, KeyStep::Decrease))),
        ("Fats -5", Some((DragMode::CarbFat, KeyStep::Increase))),
        ("Accept", None),
        ("Cancel", None),
    ];
    let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();

    let mut split = start;
    let mut last = 0;
    loop {
        display_macro_split(&split, solver.ranges());

        let choice = Select::new()
            .with_prompt("Adjust")
            .items(&labels)
            .default(last)
            .interact()?;
        last = choice;

        match actions[choice] {
            (_, Some((mode, step))) => {
                let next = solver.step(mode, split, step);
                debug!(?mode, ?step, protein = next.protein(), carbs = next.carbs(), "macro step");
                split = next;
            }
            ("Accept", None) => return Ok(split),
            _ => return Ok(start),
        }
    }
}

/// Parse a `protein/carbs` pair such as `30/45`.
pub fn parse_split(input: &str) -> Result<MacroSplit> {
    let invalid = || PlannerError::InvalidInput(format!("expected PROTEIN/CARBS, got '{}'", input));
    let (protein, carbs) = input.split_once('/').ok_or_else(invalid)?;
    let protein: u8 = protein.trim().parse().map_err(|_| invalid())?;
    let carbs: u8 = carbs.trim().parse().map_err(|_| invalid())?;
    MacroSplit::new(protein, carbs)
}
