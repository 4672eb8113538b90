use iy_core::{AssignOp, ConditionIr, EventIr, GameValue, IdleError};

use crate::store::VariableStore;

/// An absent or differently typed variable makes the comparison false.
pub fn condition_holds(condition: &ConditionIr, store: &VariableStore) -> bool {
    match condition {
        ConditionIr::Literal { value } => *value,
        ConditionIr::Compare {
            variable,
            op,
            value,
        } => store
            .get(variable)
            .map(|current| current.compare(value, *op))
            .unwrap_or(false),
    }
}

/// Events without conditions never trigger on their own.
pub fn event_triggers(event: &EventIr, store: &VariableStore) -> bool {
    !event.conditions.is_empty() && guards_hold(&event.conditions, store)
}

pub fn guards_hold(guards: &[ConditionIr], store: &VariableStore) -> bool {
    guards.iter().all(|guard| condition_holds(guard, store))
}

/// Labels of the choices whose guards all hold, in declaration order.
pub fn offered_choices(event: &EventIr, store: &VariableStore) -> Vec<String> {
    event
        .choices
        .iter()
        .filter(|choice| guards_hold(&choice.guards, store))
        .map(|choice| choice.label.clone())
        .collect()
}

pub fn apply_assignment(
    store: &mut VariableStore,
    variable: &str,
    op: AssignOp,
    value: &GameValue,
) -> Result<(), IdleError> {
    let next = match op {
        AssignOp::Set => value.clone(),
        AssignOp::Add | AssignOp::Subtract => {
            let current = store.get(variable).ok_or_else(|| {
                IdleError::type_error(format!(
                    "Operator \"{}\" needs variable \"{}\" to be defined.",
                    op.symbol(),
                    variable
                ))
            })?;
            if !current.is_numeric() || !current.same_kind(value) {
                return Err(IdleError::type_error(format!(
                    "Operator \"{}\" cannot combine {} \"{}\" with {} \"{}\".",
                    op.symbol(),
                    current.type_name(),
                    variable,
                    value.type_name(),
                    value
                )));
            }
            if op == AssignOp::Add {
                current.add(value)
            } else {
                current.subtract(value)
            }
        }
    };
    store.set(variable, next)
}
