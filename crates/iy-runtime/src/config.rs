use std::collections::BTreeMap;

use iy_core::GameValue;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RANDOM_SEED: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Size of the condition-evaluation pool; hardware concurrency when unset.
    pub worker_threads: Option<usize>,
    pub random_seed: Option<u32>,
    pub food_price: i64,
    pub food_per_purchase: i64,
    /// Applied over the registry defaults when a new game starts.
    pub initial_values: BTreeMap<String, GameValue>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            random_seed: None,
            food_price: 100,
            food_per_purchase: 100,
            initial_values: BTreeMap::new(),
        }
    }
}

impl GameConfig {
    pub fn seed(&self) -> u32 {
        self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_threads
            .filter(|count| *count > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}
