use std::sync::OnceLock;

use iy_core::{
    AssignOp, ChoiceIr, CompareOp, ConditionIr, EffectIr, EventIr, GameValue, IdleError,
    ScriptAction, ScriptButton, ScriptCondition, ScriptEvent, VariableRegistry, VariableSlot,
};
use regex::Regex;
use tracing::warn;

fn variable_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("variable name regex must compile")
    })
}

/// Lowers one parsed event. Every error carries the event header's span when
/// the failing line has none of its own.
pub fn compile_event(path: &str, event: &ScriptEvent) -> Result<EventIr, IdleError> {
    let in_event = |error: IdleError| {
        IdleError {
            message: format!("{} (event \"{}\")", error.message, event.name),
            ..error
        }
        .at(&event.location)
    };

    let conditions = event
        .conditions
        .iter()
        .map(compile_condition)
        .collect::<Result<Vec<_>, _>>()
        .map_err(in_event)?;

    let mut effects = event
        .actions
        .iter()
        .map(compile_action)
        .collect::<Result<Vec<_>, _>>()
        .map_err(in_event)?;
    effects.extend(event.buttons.iter().map(compile_button));

    let mut choices = Vec::with_capacity(event.choices.len());
    for choice in &event.choices {
        let guards = choice
            .conditions
            .iter()
            .map(compile_condition)
            .collect::<Result<Vec<_>, _>>()
            .map_err(in_event)?;
        choices.push(ChoiceIr {
            label: choice.label.clone(),
            target: choice.target.clone(),
            guards,
        });
    }

    Ok(EventIr {
        name: event.name.clone(),
        conditions,
        effects,
        choices,
        progress_max: event.progress_max,
        return_flag: event.return_flag,
        source_path: path.to_string(),
        location: event.location.clone(),
    })
}

pub fn compile_condition(condition: &ScriptCondition) -> Result<ConditionIr, IdleError> {
    match condition {
        ScriptCondition::Literal { value } => Ok(ConditionIr::Literal { value: *value }),
        ScriptCondition::Compare {
            variable,
            operator,
            value,
        } => {
            check_variable_name(variable)?;
            let op = operator.parse::<CompareOp>()?;
            if let Some(slot) = VariableRegistry::standard().lookup(variable) {
                if slot.kind() != value.kind() {
                    warn!(
                        variable = %variable,
                        expected = slot.kind().name(),
                        found = value.type_name(),
                        "comparison can never hold for a value of a different kind"
                    );
                }
            }
            Ok(ConditionIr::Compare {
                variable: variable.to_ascii_lowercase(),
                op,
                value: value.clone(),
            })
        }
    }
}

pub fn compile_action(action: &ScriptAction) -> Result<EffectIr, IdleError> {
    match action {
        ScriptAction::Print { text } => Ok(EffectIr::Print { text: text.clone() }),
        ScriptAction::Show { image } => Ok(EffectIr::Show {
            image: image.clone(),
        }),
        ScriptAction::Assign {
            variable,
            operator,
            value,
        } => {
            check_variable_name(variable)?;
            let op = parse_assign_op(operator)?;
            check_assignment(variable, op, value)?;
            Ok(EffectIr::Assign {
                variable: variable.to_ascii_lowercase(),
                op,
                value: value.clone(),
            })
        }
    }
}

fn compile_button(button: &ScriptButton) -> EffectIr {
    match &button.target {
        Some(target) => EffectIr::AddButton {
            label: button.label.clone(),
            target: target.clone(),
        },
        None => EffectIr::RemoveButton {
            label: button.label.clone(),
        },
    }
}

fn parse_assign_op(operator: &str) -> Result<AssignOp, IdleError> {
    match operator {
        "=" => Ok(AssignOp::Set),
        "+=" => Ok(AssignOp::Add),
        "-=" => Ok(AssignOp::Subtract),
        other => Err(IdleError::unknown_operator(other)),
    }
}

fn check_variable_name(name: &str) -> Result<(), IdleError> {
    if variable_name_regex().is_match(name) {
        return Ok(());
    }
    Err(IdleError::new(
        iy_core::error::SCRIPT_SYNTAX,
        format!("Invalid variable name \"{}\".", name),
    ))
}

fn check_assignment(variable: &str, op: AssignOp, value: &GameValue) -> Result<(), IdleError> {
    if op != AssignOp::Set && !value.is_numeric() {
        return Err(IdleError::type_error(format!(
            "Operator \"{}\" needs a numeric value, got {} \"{}\".",
            op.symbol(),
            value.type_name(),
            value
        )));
    }

    let Some(slot) = VariableRegistry::standard().lookup(variable) else {
        return Ok(());
    };
    if !slot.is_writable() {
        return Err(IdleError::type_error(format!(
            "Variable \"{}\" is read-only.",
            variable
        )));
    }
    let VariableSlot::Stored(builtin) = slot else {
        return Ok(());
    };
    if op != AssignOp::Set && !builtin.kind().is_numeric() {
        return Err(IdleError::type_error(format!(
            "Operator \"{}\" is not defined for {} variable \"{}\".",
            op.symbol(),
            builtin.kind().name(),
            builtin.name
        )));
    }
    if builtin.kind() != value.kind() {
        return Err(IdleError::type_error(format!(
            "Variable \"{}\" holds {} but was given {} \"{}\".",
            builtin.name,
            builtin.kind().name(),
            value.type_name(),
            value
        )));
    }
    Ok(())
}
