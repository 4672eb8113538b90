use std::collections::VecDeque;

use iy_core::{names, GameValue, IdleError};
use tracing::{debug, info};

use crate::store::VariableStore;

pub const SLEEPING: &str = "Sleeping";
pub const WATCHING_TV: &str = "Watching TV";
pub const MORNING_ROUTINE: &str = "Morning Routine";

const SLEEP_TICKS: u32 = 100;
const WATCH_TV_TICKS: u32 = 100;
const WATCH_TV_MOOD: i64 = 5;

/// Applied to the store on every advance of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEffect {
    /// `energy += 1` while below `energyMax`.
    RestoreEnergy,
}

/// Work queued by a finished run and drained by the engine in the same tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    StartMorningRoutine,
    SetRoutineBonus(i64),
    AddMood(i64),
    /// Applies the deferred effects of the named script event.
    RunEventBody(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRun {
    pub name: String,
    pub ticks: u32,
    pub target: u32,
    pub tick_effect: Option<TickEffect>,
    pub done_message: Option<String>,
    pub on_done: Vec<Transition>,
}

impl ProgressRun {
    pub fn sleep() -> Self {
        Self {
            name: SLEEPING.to_string(),
            ticks: 0,
            target: SLEEP_TICKS,
            tick_effect: Some(TickEffect::RestoreEnergy),
            done_message: Some("You slept well and feel refreshed.".to_string()),
            on_done: vec![Transition::StartMorningRoutine],
        }
    }

    pub fn watch_tv() -> Self {
        Self {
            name: WATCHING_TV.to_string(),
            ticks: 0,
            target: WATCH_TV_TICKS,
            tick_effect: None,
            done_message: Some(
                "You watched TV and feel a little happier, mood increased by 5.".to_string(),
            ),
            on_done: vec![Transition::AddMood(WATCH_TV_MOOD)],
        }
    }

    /// Shower 20 ticks / +10 bonus, shave 10 / +5, brush teeth 5 / +2.
    pub fn morning_routine(shower: bool, shave: bool, brush_teeth: bool) -> Self {
        let mut target = 0;
        let mut bonus = 0;
        for (enabled, ticks, points) in [(shower, 20, 10), (shave, 10, 5), (brush_teeth, 5, 2)] {
            if enabled {
                target += ticks;
                bonus += points;
            }
        }
        Self {
            name: MORNING_ROUTINE.to_string(),
            ticks: 0,
            target,
            tick_effect: None,
            done_message: Some("You completed your morning routine.".to_string()),
            on_done: vec![Transition::SetRoutineBonus(bonus)],
        }
    }

    pub fn morning_routine_from(store: &VariableStore) -> Self {
        Self::morning_routine(
            store.bool(names::ROUTINE_SHOWER),
            store.bool(names::ROUTINE_SHAVE),
            store.bool(names::ROUTINE_BRUSH_TEETH),
        )
    }

    /// A script event with a progress length; completion applies its body.
    pub fn script_event(name: &str, target: u32) -> Self {
        Self {
            name: name.to_string(),
            ticks: 0,
            target,
            tick_effect: None,
            done_message: None,
            on_done: vec![Transition::RunEventBody(name.to_string())],
        }
    }

    /// Built-in run for a mirrored `eventName`, if it names one.
    pub fn builtin_named(name: &str, store: &VariableStore) -> Option<Self> {
        match name {
            SLEEPING => Some(Self::sleep()),
            WATCHING_TV => Some(Self::watch_tv()),
            MORNING_ROUTINE => Some(Self::morning_routine_from(store)),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ticks >= self.target
    }
}

/// Single-slot multi-tick state machine. `eventName`, `eventValue` and
/// `eventMax` in the store always mirror the active run.
#[derive(Debug, Clone, Default)]
pub struct ProgressController {
    active: Option<ProgressRun>,
    pending: VecDeque<Transition>,
}

impl ProgressController {
    pub fn active(&self) -> Option<&ProgressRun> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Returns `false` without touching the store when a run is already active.
    pub fn start(&mut self, run: ProgressRun, store: &mut VariableStore) -> Result<bool, IdleError> {
        if let Some(active) = &self.active {
            debug!(requested = %run.name, active = %active.name, "progress slot busy");
            return Ok(false);
        }
        store.set_internal(names::WORKING, GameValue::Bool(false))?;
        store.set_internal(names::EVENT_NAME, GameValue::from(run.name.as_str()))?;
        store.set_internal(names::EVENT_VALUE, GameValue::Int(i64::from(run.ticks)))?;
        store.set_internal(names::EVENT_MAX, GameValue::Int(i64::from(run.target)))?;
        info!(run = %run.name, target = run.target, "progress run started");
        self.active = Some(run);
        Ok(true)
    }

    /// Puts a run back into the slot without the start side effects.
    pub(crate) fn restore(&mut self, run: ProgressRun) {
        self.active = Some(run);
    }

    /// Advances the active run by one tick. Returns the run if it finished;
    /// its completion transitions are queued.
    pub fn advance(&mut self, store: &mut VariableStore) -> Result<Option<ProgressRun>, IdleError> {
        let Some(run) = self.active.as_mut() else {
            return Ok(None);
        };
        run.ticks = run.ticks.saturating_add(1);
        store.set_internal(names::EVENT_VALUE, GameValue::Int(i64::from(run.ticks)))?;
        if let Some(TickEffect::RestoreEnergy) = run.tick_effect {
            let energy = store.int(names::ENERGY);
            if energy < store.int(names::ENERGY_MAX) {
                store.set_internal(names::ENERGY, GameValue::Int(energy + 1))?;
            }
        }
        if !run.is_complete() {
            return Ok(None);
        }

        let Some(run) = self.active.take() else {
            return Ok(None);
        };
        store.set_internal(names::EVENT_NAME, GameValue::from(""))?;
        store.set_internal(names::WORKING, GameValue::Bool(true))?;
        self.pending.extend(run.on_done.iter().cloned());
        info!(run = %run.name, ticks = run.ticks, "progress run finished");
        Ok(Some(run))
    }

    pub fn next_transition(&mut self) -> Option<Transition> {
        self.pending.pop_front()
    }
}
