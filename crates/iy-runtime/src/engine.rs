use std::collections::{BTreeMap, HashMap, VecDeque};

use iy_core::{EventIr, GameValue, IdleError};
use rayon::ThreadPool;

use crate::config::GameConfig;
use crate::progress::{ProgressController, ProgressRun};
use crate::store::VariableStore;

mod actions;
mod lifecycle;
mod snapshot;
mod tick;

pub use lifecycle::{IdleEngineOptions, SNAPSHOT_SCHEMA};

/// A compiled event plus its one-way `done` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub ir: EventIr,
    pub done: bool,
}

/// Choices offered by the most recent choice-bearing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChoice {
    pub event_name: String,
    pub text: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    WatchTv,
    BuyFood,
    BuyFoodMax,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// False when the tick was skipped because the game is paused or over.
    pub ticked: bool,
    pub triggered: Vec<String>,
    pub finished_runs: Vec<String>,
    /// Events whose effects failed this tick; none of their writes landed.
    pub failed: Vec<String>,
    pub game_over: bool,
}

pub struct IdleEngine {
    events: Vec<Event>,
    event_index: HashMap<String, usize>,
    store: VariableStore,
    progress: ProgressController,
    messages: VecDeque<String>,
    buttons: BTreeMap<String, String>,
    choice: Option<PendingChoice>,
    game_over: bool,
    config: GameConfig,
    pool: Option<ThreadPool>,
}

impl IdleEngine {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.event_index.get(name).map(|index| &self.events[*index])
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn get(&self, name: &str) -> Option<GameValue> {
        self.store.get(name)
    }

    /// Writes a variable from outside the script, with the same checks as `=`.
    pub fn set_variable(&mut self, name: &str, value: GameValue) -> Result<(), IdleError> {
        self.store.set(name, value)
    }

    pub fn active_run(&self) -> Option<&ProgressRun> {
        self.progress.active()
    }

    pub fn choice(&self) -> Option<&PendingChoice> {
        self.choice.as_ref()
    }

    /// Newest first.
    pub fn messages(&self) -> impl Iterator<Item = &String> {
        self.messages.iter()
    }

    pub fn buttons(&self) -> &BTreeMap<String, String> {
        &self.buttons
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn post_message(&mut self, message: impl Into<String>) {
        self.messages.push_front(message.into());
    }
}



#[cfg(test)]
mod snapshot_tests;
