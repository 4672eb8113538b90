use iy_core::{names, GameValue, IdleError};
use tracing::{debug, info};

use super::{IdleEngine, PlayerAction};
use crate::progress::ProgressRun;

impl IdleEngine {
    /// Resolves the pending choice and fires the chosen target, bypassing its
    /// conditions.
    pub fn select_choice(&mut self, label: &str) -> Result<(), IdleError> {
        let Some(choice) = self.choice.as_ref() else {
            return Err(IdleError::new(
                "ENGINE_NO_PENDING_CHOICE",
                "No choice is waiting for a selection.",
            ));
        };
        if !choice.labels.iter().any(|offered| offered == label) {
            return Err(IdleError::new(
                "ENGINE_CHOICE_NOT_OFFERED",
                format!("Choice \"{}\" is not offered.", label),
            ));
        }

        let origin = self.event_index.get(&choice.event_name).copied().ok_or_else(|| {
            IdleError::new(
                "ENGINE_EVENT_UNKNOWN",
                format!("Choice event \"{}\" is not loaded.", choice.event_name),
            )
        })?;
        let target = self.events[origin]
            .ir
            .choice(label)
            .map(|choice| choice.target.clone())
            .unwrap_or_default();
        let target_index = self.resolve_target(&target)?;

        let pending = self.choice.take();
        let origin_done = self.events[origin].done;
        if self.events[origin].ir.return_flag {
            self.events[origin].done = true;
        }
        info!(label, target = %target, "choice selected");
        self.run_event(target_index).map_err(|error| {
            self.choice = pending;
            self.events[origin].done = origin_done;
            error
        })
    }

    pub fn press_button(&mut self, label: &str) -> Result<(), IdleError> {
        let target = self.buttons.get(label).cloned().ok_or_else(|| {
            IdleError::new(
                "ENGINE_BUTTON_UNKNOWN",
                format!("Button \"{}\" is not shown.", label),
            )
        })?;
        let index = self.resolve_target(&target)?;
        debug!(label, target = %target, "button pressed");
        self.run_event(index)
    }

    /// Returns `false` when the action had no effect: the progress slot was
    /// busy or there was not enough money.
    pub fn perform(&mut self, action: PlayerAction) -> Result<bool, IdleError> {
        if self.game_over {
            return Ok(false);
        }
        match action {
            PlayerAction::WatchTv => self.progress.start(ProgressRun::watch_tv(), &mut self.store),
            PlayerAction::BuyFood => {
                if self.store.int(names::MONEY) < self.config.food_price {
                    return Ok(false);
                }
                self.buy_food(1)?;
                self.post_message("You bought food!");
                Ok(true)
            }
            PlayerAction::BuyFoodMax => {
                let price = self.config.food_price.max(1);
                let units = self.store.int(names::MONEY) / price;
                if units <= 0 {
                    return Ok(false);
                }
                self.buy_food(units)?;
                self.post_message(format!("You bought {} food!", units));
                Ok(true)
            }
        }
    }

    fn buy_food(&mut self, units: i64) -> Result<(), IdleError> {
        let money = self.store.int(names::MONEY);
        let food = self.store.int(names::FOOD) + units * self.config.food_per_purchase;
        self.store
            .set(names::MONEY, GameValue::Int(money - units * self.config.food_price))?;
        self.store.set(names::FOOD, GameValue::Int(food))?;
        self.store.set(names::FOOD_MAX, GameValue::Int(food))
    }

    fn resolve_target(&self, target: &str) -> Result<usize, IdleError> {
        self.event_index.get(target).copied().ok_or_else(|| {
            IdleError::new(
                "ENGINE_EVENT_UNKNOWN",
                format!("Target event \"{}\" is not loaded.", target),
            )
        })
    }
}
