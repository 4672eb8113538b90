use std::collections::BTreeMap;

use iy_core::GameSnapshot;
use iy_runtime::GameConfig;
use serde::{Deserialize, Serialize};

pub(crate) const PLAYER_STATE_SCHEMA: &str = "player-state.v1";
pub(crate) const MODS_DIR_REF_PREFIX: &str = "mods-dir:";
pub(crate) const BUILTIN_MODS_REF: &str = "builtin:default";

#[derive(Debug, Clone)]
pub(crate) struct LoadedMods {
    pub(crate) id: String,
    pub(crate) sources: BTreeMap<String, String>,
}

/// Everything needed to rebuild a session: where the scripts came from, the
/// config the session was started with, and the engine snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerStateV1 {
    pub(crate) schema_version: String,
    pub(crate) mods_ref: String,
    pub(crate) config: GameConfig,
    pub(crate) snapshot: GameSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ProgressView {
    pub(crate) name: String,
    pub(crate) value: u32,
    pub(crate) max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ButtonView {
    pub(crate) label: String,
    pub(crate) target: String,
}
