use std::collections::{BTreeMap, HashMap, VecDeque};

use iy_core::{EventIr, IdleError};
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use super::{Event, IdleEngine};
use crate::config::GameConfig;
use crate::progress::ProgressController;
use crate::store::VariableStore;

pub const SNAPSHOT_SCHEMA: &str = "idle-snapshot.v1";

#[derive(Debug, Clone, Default)]
pub struct IdleEngineOptions {
    pub events: Vec<EventIr>,
    pub config: GameConfig,
}

impl IdleEngine {
    pub fn new(options: IdleEngineOptions) -> Result<Self, IdleError> {
        let mut event_index = HashMap::with_capacity(options.events.len());
        for (index, event) in options.events.iter().enumerate() {
            if event_index.insert(event.name.clone(), index).is_some() {
                return Err(IdleError::with_span(
                    "ENGINE_EVENT_DUPLICATE",
                    format!("Event \"{}\" is declared more than once.", event.name),
                    event.location.clone(),
                ));
            }
        }

        let store = VariableStore::with_overrides(options.config.seed(), &options.config.initial_values)
            .map_err(|error| IdleError {
                code: "ENGINE_CONFIG_INVALID".to_string(),
                message: format!("Invalid initial value: {}", error.message),
                span: None,
            })?;

        let workers = options.config.worker_count();
        let pool = if workers > 1 {
            match ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => Some(pool),
                Err(error) => {
                    warn!(workers, %error, "falling back to sequential condition scan");
                    None
                }
            }
        } else {
            None
        };

        info!(events = options.events.len(), workers, "engine ready");
        Ok(Self {
            events: options
                .events
                .into_iter()
                .map(|ir| Event { ir, done: false })
                .collect(),
            event_index,
            store,
            progress: ProgressController::default(),
            messages: VecDeque::new(),
            buttons: BTreeMap::new(),
            choice: None,
            game_over: false,
            config: options.config,
            pool,
        })
    }
}
