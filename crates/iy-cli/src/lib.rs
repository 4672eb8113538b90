use std::ffi::OsString;

use clap::Parser;
use iy_core::IdleError;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod agent;
mod cli_args;
mod error_map;
mod models;
mod session_ops;
mod source_loader;
mod state_store;

pub(crate) use cli_args::{
    ActArgs, AgentArgs, AgentCommand, ChooseArgs, Cli, Mode, PressArgs, StartArgs, TickArgs,
};
pub(crate) use error_map::{
    emit_error, map_cli_config_invalid, map_cli_config_read, map_cli_source_path,
    map_cli_source_read, map_cli_source_scan, map_cli_state_encode, map_cli_state_invalid,
    map_cli_state_read, map_cli_state_write,
};
pub(crate) use models::{
    ButtonView, LoadedMods, PlayerStateV1, ProgressView, BUILTIN_MODS_REF, MODS_DIR_REF_PREFIX,
    PLAYER_STATE_SCHEMA,
};
pub(crate) use session_ops::{
    create_engine_for_mods, emit_session_with_saved_state, load_engine_from_state, run_ticks,
};
#[cfg(test)]
pub(crate) use source_loader::load_builtin_mods;
pub(crate) use source_loader::{load_mods, load_mods_by_ref};
pub(crate) use state_store::{load_game_config, load_player_state, save_player_state};

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// `warn` level; stdout is left to the agent protocol.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, IdleError> {
    match cli.command {
        Mode::Agent(args) => agent::run_agent(args),
    }
}

pub(crate) fn json_text<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
pub(crate) mod cli_test_support {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("idle-cli-{}-{}", name, nanos))
    }

    pub(crate) fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, content).expect("file should be written");
    }

    pub(crate) fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_cli_reports_parse_failures_with_clap_exit_code() {
        assert_eq!(run_cli_from_args(["idle-player", "agent", "bogus"]), 2);
    }

    #[test]
    fn run_cli_maps_missing_state_to_error_exit() {
        let missing = cli_test_support::temp_path("no-state.json");
        let code = run_cli_from_args([
            "idle-player".to_string(),
            "agent".to_string(),
            "tick".to_string(),
            "--state-in".to_string(),
            missing.to_string_lossy().to_string(),
            "--state-out".to_string(),
            "unused.json".to_string(),
        ]);
        assert_eq!(code, 1);
    }

    #[test]
    fn json_text_escapes_strings() {
        assert_eq!(json_text("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
