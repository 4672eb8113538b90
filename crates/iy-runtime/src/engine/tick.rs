use iy_core::{names, EffectIr, GameValue, IdleError};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{IdleEngine, PendingChoice, TickReport};
use crate::eval::{apply_assignment, event_triggers, offered_choices};
use crate::progress::{ProgressRun, Transition, SLEEPING};

impl IdleEngine {
    /// Runs one simulation step.
    ///
    /// Mechanics first, then a read-only condition scan over every pending
    /// event on the worker pool, then the triggered events' effects in
    /// declaration order on the calling thread. A run that was active when
    /// the tick began advances last. An event whose effects fail is skipped
    /// with nothing applied and listed in [`TickReport::failed`].
    pub fn tick(&mut self) -> Result<TickReport, IdleError> {
        if self.game_over || self.store.bool(names::PAUSED) {
            return Ok(TickReport {
                game_over: self.game_over,
                ..TickReport::default()
            });
        }

        let mut report = TickReport {
            ticked: true,
            ..TickReport::default()
        };
        let active_at_start = self.progress.active().map(|run| run.name.clone());

        self.apply_mechanics(active_at_start.as_deref())?;
        if self.game_over {
            report.game_over = true;
            return Ok(report);
        }

        for index in self.scan_conditions() {
            if self.events[index].done || (self.choice.is_some() && self.events[index].ir.has_choices()) {
                continue;
            }
            let name = self.events[index].ir.name.clone();
            match self.run_event(index) {
                Ok(()) => report.triggered.push(name),
                Err(error) => {
                    warn!(event = %name, code = %error.code, "{}", error.message);
                    report.failed.push(name);
                }
            }
        }

        if active_at_start.is_some() {
            if let Some(run) = self.progress.advance(&mut self.store)? {
                if let Some(message) = &run.done_message {
                    self.post_message(message.clone());
                }
                report.finished_runs.push(run.name);
                self.drain_transitions(&mut report)?;
            }
        }

        debug!(
            ticks = self.store.int(names::TICKS),
            triggered = report.triggered.len(),
            "tick complete"
        );
        Ok(report)
    }

    fn apply_mechanics(&mut self, active_run: Option<&str>) -> Result<(), IdleError> {
        let ticks = self.store.int(names::TICKS);
        self.store.set(names::TICKS, GameValue::Int(ticks.wrapping_add(1)))?;

        let working = self.store.bool(names::WORKING);
        if working {
            let work = self.store.int(names::WORK);
            if work < 100 {
                self.store.set(names::WORK, GameValue::Int(work + 1))?;
                let xp = self.store.int(names::WORK_XP);
                self.store.set(names::WORK_XP, GameValue::Int(xp + 1))?;
            } else {
                let salary = self.store.int(names::SALARY);
                self.store.set(names::WORK, GameValue::Int(0))?;
                let money = self.store.int(names::MONEY);
                self.store.set(names::MONEY, GameValue::Int(money + salary))?;
                self.post_message(format!("You were paid ${} for your work!", salary));
            }

            let energy = self.store.int(names::ENERGY);
            if energy > 0 {
                let drain = if self.store.int(names::MOOD) < 50 { 2 } else { 1 };
                self.store
                    .set(names::ENERGY, GameValue::Int((energy - drain).max(0)))?;
            } else if !self.progress.is_active() {
                self.progress.start(ProgressRun::sleep(), &mut self.store)?;
            }
        }

        let sleeping = active_run == Some(SLEEPING);
        let food = self.store.int(names::FOOD);
        if food > 0 {
            if !sleeping {
                self.store.set(names::FOOD, GameValue::Int(food - 1))?;
            }
        } else if !sleeping {
            self.game_over = true;
            self.post_message("You ran out of food. Game over!");
            info!(ticks = ticks + 1, "game over");
        }
        Ok(())
    }

    /// Indices of the events whose conditions hold, in declaration order.
    fn scan_conditions(&self) -> Vec<usize> {
        let store = &self.store;
        let choice_pending = self.choice.is_some();
        let evaluate = |event: &super::Event| {
            !event.done
                && !(choice_pending && event.ir.has_choices())
                && event_triggers(&event.ir, store)
        };

        let flags = match &self.pool {
            Some(pool) => pool.install(|| self.events.par_iter().map(evaluate).collect::<Vec<_>>()),
            None => self.events.iter().map(evaluate).collect::<Vec<_>>(),
        };
        flags
            .into_iter()
            .enumerate()
            .filter_map(|(index, fired)| fired.then_some(index))
            .collect()
    }

    /// Fires an event regardless of its conditions. Does nothing once it is done.
    pub(super) fn run_event(&mut self, index: usize) -> Result<(), IdleError> {
        if self.events[index].done {
            return Ok(());
        }
        let event = &self.events[index].ir;
        debug!(event = %event.name, "event fired");

        let labels = event
            .has_choices()
            .then(|| offered_choices(event, &self.store));

        let finished = if event.progress_max > 0 {
            let run = ProgressRun::script_event(&event.name, event.progress_max);
            let return_flag = event.return_flag;
            self.offer_choice(index, labels, String::new());
            self.progress.start(run, &mut self.store)? && return_flag
        } else {
            let text = self.apply_effects(index)?;
            self.offer_choice(index, labels, text.unwrap_or_default());
            self.events[index].ir.return_flag
        };

        if finished {
            self.events[index].done = true;
        }
        Ok(())
    }

    fn offer_choice(&mut self, index: usize, labels: Option<Vec<String>>, text: String) {
        if let Some(labels) = labels {
            self.choice = (!labels.is_empty()).then(|| PendingChoice {
                event_name: self.events[index].ir.name.clone(),
                text,
                labels,
            });
        }
    }

    /// Applies an event's effects as one unit. Assignments run against a
    /// staged copy of the store; if any of them fails nothing is written.
    /// Output of a choice-bearing event is returned as the choice text
    /// instead of reaching the feed.
    pub(super) fn apply_effects(&mut self, index: usize) -> Result<Option<String>, IdleError> {
        let event = &self.events[index].ir;
        let mut staged = self.store.clone();
        for effect in &event.effects {
            if let EffectIr::Assign {
                variable,
                op,
                value,
            } = effect
            {
                apply_assignment(&mut staged, variable, *op, value).map_err(|error| {
                    IdleError {
                        message: format!("{} (event \"{}\")", error.message, event.name),
                        ..error
                    }
                    .at(&event.location)
                })?;
            }
        }
        self.store = staged;

        let choice_mode = event.has_choices();
        let mut choice_text = None;
        for effect in &event.effects {
            match effect {
                EffectIr::Print { text } if choice_mode => choice_text = Some(text.clone()),
                EffectIr::Show { image } if choice_mode => choice_text = Some(image.clone()),
                EffectIr::Print { text } => self.messages.push_front(text.clone()),
                EffectIr::Show { image } => self.messages.push_front(format!("Image: {}", image)),
                EffectIr::Assign { .. } => {}
                EffectIr::AddButton { label, target } => {
                    self.buttons.insert(label.clone(), target.clone());
                }
                EffectIr::RemoveButton { label } => {
                    self.buttons.remove(label);
                }
            }
        }
        Ok(choice_text)
    }

    pub(super) fn drain_transitions(&mut self, report: &mut TickReport) -> Result<(), IdleError> {
        while let Some(transition) = self.progress.next_transition() {
            match transition {
                Transition::StartMorningRoutine => {
                    let run = ProgressRun::morning_routine_from(&self.store);
                    self.progress.start(run, &mut self.store)?;
                }
                Transition::SetRoutineBonus(bonus) => {
                    self.store
                        .set(names::ROUTINE_BONUS, GameValue::Int(bonus))?;
                }
                Transition::AddMood(amount) => {
                    let mood = self.store.int(names::MOOD);
                    self.store.set(names::MOOD, GameValue::Int(mood + amount))?;
                }
                Transition::RunEventBody(name) => match self.event_index.get(&name).copied() {
                    Some(index) => match self.apply_effects(index) {
                        Ok(Some(text)) => {
                            if let Some(choice) = own_choice(&mut self.choice, &name) {
                                choice.text = text;
                            }
                        }
                        Ok(None) => {}
                        Err(error) => {
                            warn!(event = %name, code = %error.code, "{}", error.message);
                            report.failed.push(name);
                        }
                    },
                    None => {
                        return Err(IdleError::new(
                            "ENGINE_EVENT_UNKNOWN",
                            format!("Progress run \"{}\" has no matching event.", name),
                        ))
                    }
                },
            }
        }
        Ok(())
    }
}

/// The pending choice, if `event` is the one that offered it.
fn own_choice<'a>(
    choice: &'a mut Option<PendingChoice>,
    event: &str,
) -> Option<&'a mut PendingChoice> {
    choice.as_mut().filter(|choice| choice.event_name == event)
}
