use std::collections::{BTreeMap, BTreeSet};

use iy_core::{EventIr, IdleError};
use iy_parser::parse_script;
use tracing::{debug, warn};

mod event_compile;

pub use event_compile::{compile_action, compile_condition, compile_event};

pub const SCRIPT_EVENT_DUPLICATE: &str = "SCRIPT_EVENT_DUPLICATE";

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedSource {
    pub path: String,
    pub error: IdleError,
}

#[derive(Debug, Clone, Default)]
pub struct CompileBundleResult {
    /// Events of every accepted source, in path order then declaration order.
    pub events: Vec<EventIr>,
    pub rejected: Vec<RejectedSource>,
}

pub fn compile_script(path: &str, source: &str) -> Result<Vec<EventIr>, IdleError> {
    parse_script(source)?
        .iter()
        .map(|event| compile_event(path, event))
        .collect()
}

/// Compiles every source independently. A source that fails to parse or
/// compile is rejected as a whole and the remaining sources still load.
pub fn compile_bundle_from_source_map(sources: &BTreeMap<String, String>) -> CompileBundleResult {
    let mut result = CompileBundleResult::default();
    let mut names = BTreeSet::new();

    for (path, source) in sources {
        let events = match compile_script(path, source) {
            Ok(events) => events,
            Err(error) => {
                reject(&mut result, path, error);
                continue;
            }
        };

        if let Some(duplicate) = events.iter().find(|event| names.contains(&event.name)) {
            let error = IdleError::with_span(
                SCRIPT_EVENT_DUPLICATE,
                format!(
                    "Event \"{}\" is already declared by another source.",
                    duplicate.name
                ),
                duplicate.location.clone(),
            );
            reject(&mut result, path, error);
            continue;
        }

        debug!(path = %path, events = events.len(), "compiled script source");
        names.extend(events.iter().map(|event| event.name.clone()));
        result.events.extend(events);
    }

    warn_unknown_targets(&result.events, &names);
    result
}

fn reject(result: &mut CompileBundleResult, path: &str, error: IdleError) {
    warn!(
        path = %path,
        code = %error.code,
        line = error.line().unwrap_or_default(),
        "skipping script source: {}",
        error.message
    );
    result.rejected.push(RejectedSource {
        path: path.to_string(),
        error,
    });
}

fn warn_unknown_targets(events: &[EventIr], names: &BTreeSet<String>) {
    for event in events {
        let choice_targets = event.choices.iter().map(|choice| &choice.target);
        let button_targets = event.effects.iter().filter_map(|effect| match effect {
            iy_core::EffectIr::AddButton { target, .. } => Some(target),
            _ => None,
        });
        for target in choice_targets.chain(button_targets) {
            if !names.contains(target) {
                warn!(event = %event.name, target = %target, "target event is not declared");
            }
        }
    }
}

#[cfg(test)]
mod tests;
