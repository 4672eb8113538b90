use std::path::Path;

use iy_api::{
    create_engine_from_sources, resume_engine_from_sources, CreateEngineOptions, LoadedEngine,
    RejectedSource, ResumeEngineOptions,
};
use iy_core::IdleError;
use iy_runtime::{GameConfig, IdleEngine};
use tracing::{debug, info};

use crate::{
    json_text, load_mods_by_ref, load_player_state, save_player_state, ButtonView, LoadedMods,
    PlayerStateV1, ProgressView, PLAYER_STATE_SCHEMA,
};

pub(crate) fn create_engine_for_mods(
    mods: &LoadedMods,
    config: GameConfig,
) -> Result<LoadedEngine, IdleError> {
    create_engine_from_sources(CreateEngineOptions {
        sources: mods.sources.clone(),
        config,
    })
}

pub(crate) fn resume_engine_for_state(
    mods: &LoadedMods,
    state: &PlayerStateV1,
) -> Result<LoadedEngine, IdleError> {
    resume_engine_from_sources(ResumeEngineOptions {
        sources: mods.sources.clone(),
        config: state.config.clone(),
        snapshot: state.snapshot.clone(),
    })
}

pub(crate) fn load_engine_from_state(
    path: &Path,
) -> Result<(PlayerStateV1, LoadedEngine), IdleError> {
    let state = load_player_state(path)?;
    let mods = load_mods_by_ref(&state.mods_ref)?;
    let loaded = resume_engine_for_state(&mods, &state)?;
    Ok((state, loaded))
}

pub(crate) fn save_engine_state(
    path: &Path,
    engine: &IdleEngine,
    mods_ref: &str,
) -> Result<(), IdleError> {
    let state = PlayerStateV1 {
        schema_version: PLAYER_STATE_SCHEMA.to_string(),
        mods_ref: mods_ref.to_string(),
        config: engine.config().clone(),
        snapshot: engine.to_snapshot(),
    };
    save_player_state(path, &state)
}

/// Runs up to `ticks` ticks, stopping early once the game is over. Returns
/// how many ticks advanced the session.
pub(crate) fn run_ticks(engine: &mut IdleEngine, ticks: u32) -> Result<u32, IdleError> {
    let mut advanced = 0;
    for _ in 0..ticks {
        if engine.is_game_over() {
            break;
        }
        let report = engine.tick()?;
        if report.ticked {
            advanced += 1;
        }
        if !report.triggered.is_empty() || !report.finished_runs.is_empty() {
            debug!(
                triggered = ?report.triggered,
                finished = ?report.finished_runs,
                "tick"
            );
        }
    }
    info!(requested = ticks, advanced, "ticks run");
    Ok(advanced)
}

/// Renders the agent output block. `seen_messages` is the length of the
/// message feed before the command ran; only newer messages are listed,
/// oldest first.
pub(crate) fn render_session(
    engine: &IdleEngine,
    seen_messages: usize,
    rejected: &[RejectedSource],
    state_out: &str,
) -> Vec<String> {
    let mut lines = vec![
        "RESULT:OK".to_string(),
        format!("TICKS:{}", engine.store().int("ticks")),
        format!("GAME_OVER:{}", engine.is_game_over()),
    ];

    match engine.active_run() {
        Some(run) => lines.push(format!(
            "PROGRESS:{}",
            json_text(&ProgressView {
                name: run.name.clone(),
                value: run.ticks,
                max: run.target,
            })
        )),
        None => lines.push("PROGRESS:NONE".to_string()),
    }

    let messages = engine.messages().collect::<Vec<_>>();
    let fresh = messages.len().saturating_sub(seen_messages);
    for message in messages[..fresh].iter().rev() {
        lines.push(format!("MESSAGE_JSON:{}", json_text(message)));
    }

    if let Some(choice) = engine.choice() {
        lines.push(format!("CHOICE_EVENT_JSON:{}", json_text(&choice.event_name)));
        if !choice.text.is_empty() {
            lines.push(format!("CHOICE_TEXT_JSON:{}", json_text(&choice.text)));
        }
        for label in &choice.labels {
            lines.push(format!("CHOICE_JSON:{}", json_text(label)));
        }
    }

    for (label, target) in engine.buttons() {
        lines.push(format!(
            "BUTTON_JSON:{}",
            json_text(&ButtonView {
                label: label.clone(),
                target: target.clone(),
            })
        ));
    }

    for source in rejected {
        lines.push(format!(
            "REJECTED:{}|{}|{}",
            source.path,
            source.error.code,
            json_text(&source.error.message)
        ));
    }

    lines.push(format!("STATE_OUT:{}", state_out));
    lines
}

pub(crate) fn emit_session_with_saved_state(
    engine: &IdleEngine,
    seen_messages: usize,
    rejected: &[RejectedSource],
    state_out: &str,
    mods_ref: &str,
) -> Result<i32, IdleError> {
    save_engine_state(Path::new(state_out), engine, mods_ref)?;
    for line in render_session(engine, seen_messages, rejected, state_out) {
        println!("{}", line);
    }
    Ok(0)
}
