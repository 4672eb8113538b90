use std::path::Path;

use iy_api::LoadedEngine;
use iy_core::IdleError;
use iy_runtime::{IdleEngine, PlayerAction};
use tracing::warn;

use crate::{
    create_engine_for_mods, emit_session_with_saved_state, load_engine_from_state,
    load_game_config, load_mods, run_ticks, ActArgs, AgentArgs, AgentCommand, ChooseArgs,
    PressArgs, StartArgs, TickArgs,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, IdleError> {
    match args.command {
        AgentCommand::Start(args) => run_start(args),
        AgentCommand::Tick(args) => run_tick(args),
        AgentCommand::Choose(args) => run_choose(args),
        AgentCommand::Act(args) => run_act(args),
        AgentCommand::Press(args) => run_press(args),
    }
}

pub(super) fn run_start(args: StartArgs) -> Result<i32, IdleError> {
    let mods = load_mods(args.mods_dir.as_deref())?;
    let config = load_game_config(args.config.as_deref())?;
    let LoadedEngine {
        mut engine,
        rejected,
    } = create_engine_for_mods(&mods, config)?;

    run_ticks(&mut engine, args.ticks)?;
    emit_session_with_saved_state(&engine, 0, &rejected, &args.state_out, &mods.id)
}

pub(super) fn run_tick(args: TickArgs) -> Result<i32, IdleError> {
    run_state_transition(&args.state_in, &args.state_out, |engine| {
        run_ticks(engine, args.ticks).map(|_| ())
    })
}

pub(super) fn run_choose(args: ChooseArgs) -> Result<i32, IdleError> {
    run_state_transition(&args.state_in, &args.state_out, |engine| {
        engine.select_choice(&args.choice)
    })
}

pub(super) fn run_act(args: ActArgs) -> Result<i32, IdleError> {
    let action = PlayerAction::from(args.action);
    run_state_transition(&args.state_in, &args.state_out, |engine| {
        if !engine.perform(action)? {
            warn!(?action, "action had no effect");
        }
        Ok(())
    })
}

pub(super) fn run_press(args: PressArgs) -> Result<i32, IdleError> {
    run_state_transition(&args.state_in, &args.state_out, |engine| {
        engine.press_button(&args.button)
    })
}

fn run_state_transition(
    state_in: &str,
    state_out: &str,
    transition: impl FnOnce(&mut IdleEngine) -> Result<(), IdleError>,
) -> Result<i32, IdleError> {
    let (state, loaded) = load_engine_from_state(Path::new(state_in))?;
    let LoadedEngine {
        mut engine,
        rejected,
    } = loaded;
    let seen_messages = engine.messages().count();
    transition(&mut engine)?;
    emit_session_with_saved_state(&engine, seen_messages, &rejected, state_out, &state.mods_ref)
}
