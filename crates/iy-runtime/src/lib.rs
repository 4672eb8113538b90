mod config;
mod engine;
mod eval;
mod progress;
mod rng;
mod store;

pub use config::{GameConfig, DEFAULT_RANDOM_SEED};
pub use engine::{
    Event, IdleEngine, IdleEngineOptions, PendingChoice, PlayerAction, TickReport, SNAPSHOT_SCHEMA,
};
pub use eval::{apply_assignment, condition_holds, event_triggers, guards_hold, offered_choices};
pub use progress::{
    ProgressController, ProgressRun, TickEffect, Transition, MORNING_ROUTINE, SLEEPING,
    WATCHING_TV,
};
pub use store::VariableStore;
