use std::collections::VecDeque;

use iy_core::{names, ChoiceSnapshot, GameSnapshot, IdleError};
use tracing::warn;

use super::{IdleEngine, PendingChoice, SNAPSHOT_SCHEMA};
use crate::progress::{ProgressController, ProgressRun};
use crate::store::VariableStore;

impl IdleEngine {
    pub fn to_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            schema_version: SNAPSHOT_SCHEMA.to_string(),
            values: self.store.builtin_values(),
            variables: self.store.user_variables(),
            messages: self.messages.iter().cloned().collect(),
            buttons: self.buttons.clone(),
            done_events: self
                .events
                .iter()
                .filter(|event| event.done)
                .map(|event| event.ir.name.clone())
                .collect(),
            choice: self.choice.as_ref().map(|choice| ChoiceSnapshot {
                event_name: choice.event_name.clone(),
                text: choice.text.clone(),
                labels: choice.labels.clone(),
            }),
            game_over: self.game_over,
            rng_state: self.store.rng_state(),
        }
    }

    /// Replaces the session state with `snapshot`. Events, buttons and
    /// choices naming events that are no longer loaded are dropped.
    pub fn from_snapshot(&mut self, snapshot: GameSnapshot) -> Result<(), IdleError> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA {
            return Err(IdleError::new(
                "SNAPSHOT_SCHEMA",
                format!(
                    "Unsupported snapshot schema \"{}\", expected \"{}\".",
                    snapshot.schema_version, SNAPSHOT_SCHEMA
                ),
            ));
        }

        let mut store = VariableStore::new(snapshot.rng_state);
        for (name, value) in snapshot.values {
            store.restore_builtin(&name, value)?;
        }
        for (name, value) in snapshot.variables {
            if store.registry().lookup(&name).is_some() {
                return Err(IdleError::new(
                    "SNAPSHOT_VARIABLE_SHADOWS_BUILTIN",
                    format!("User variable \"{}\" shadows a built-in.", name),
                ));
            }
            store.set(&name, value)?;
        }
        store.set_rng_state(snapshot.rng_state);

        for event in &mut self.events {
            event.done = false;
        }
        for name in &snapshot.done_events {
            match self.event_index.get(name) {
                Some(index) => self.events[*index].done = true,
                None => warn!(event = %name, "dropping done flag of unknown event"),
            }
        }

        self.progress = ProgressController::default();
        let run_name = store.string(names::EVENT_NAME);
        if !run_name.is_empty() {
            match self.rebuild_run(&run_name, &store) {
                Some(run) => self.progress.restore(run),
                None => {
                    warn!(run = %run_name, "dropping in-flight run of unknown event");
                    store.set_internal(names::EVENT_NAME, iy_core::GameValue::from(""))?;
                }
            }
        }

        self.choice = snapshot.choice.and_then(|choice| {
            if self.event_index.contains_key(&choice.event_name) {
                Some(PendingChoice {
                    event_name: choice.event_name,
                    text: choice.text,
                    labels: choice.labels,
                })
            } else {
                warn!(event = %choice.event_name, "dropping choice of unknown event");
                None
            }
        });
        self.store = store;
        self.messages = VecDeque::from(snapshot.messages);
        self.buttons = snapshot.buttons;
        self.game_over = snapshot.game_over;
        Ok(())
    }

    fn rebuild_run(&self, name: &str, store: &VariableStore) -> Option<ProgressRun> {
        let mut run = ProgressRun::builtin_named(name, store).or_else(|| {
            self.event(name)
                .filter(|event| event.ir.progress_max > 0)
                .map(|event| ProgressRun::script_event(name, event.ir.progress_max))
        })?;
        run.ticks = u32::try_from(store.int(names::EVENT_VALUE)).unwrap_or(0);
        run.target = u32::try_from(store.int(names::EVENT_MAX)).unwrap_or(run.target);
        Some(run)
    }
}
