use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use iy_core::{
    names, BuiltinVariable, DerivedVariable, GameValue, IdleError, UpperBound, VariableRegistry,
    VariableSlot,
};

use crate::rng::{next_random_u32, unit_interval};

/// Name to value map with clamp policies for built-ins.
///
/// Keys are stored lower-cased. Built-ins are seeded from the registry
/// defaults; any other name becomes a user variable on its first write.
#[derive(Debug)]
pub struct VariableStore {
    registry: &'static VariableRegistry,
    values: BTreeMap<String, GameValue>,
    rng_state: AtomicU32,
}

impl Clone for VariableStore {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry,
            values: self.values.clone(),
            rng_state: AtomicU32::new(self.rng_state()),
        }
    }
}

impl VariableStore {
    pub fn new(random_seed: u32) -> Self {
        let registry = VariableRegistry::standard();
        let values = registry
            .builtins()
            .map(|builtin| (builtin.key(), builtin.default.clone()))
            .collect();
        Self {
            registry,
            values,
            rng_state: AtomicU32::new(random_seed),
        }
    }

    /// Builds a store and applies `overrides` with the same checks as a script write.
    pub fn with_overrides(
        random_seed: u32,
        overrides: &BTreeMap<String, GameValue>,
    ) -> Result<Self, IdleError> {
        let mut store = Self::new(random_seed);
        for (name, value) in overrides {
            store.set(name, value.clone())?;
        }
        Ok(store)
    }

    pub fn registry(&self) -> &'static VariableRegistry {
        self.registry
    }

    pub fn get(&self, name: &str) -> Option<GameValue> {
        let key = name.to_ascii_lowercase();
        match self.registry.lookup(&key) {
            Some(VariableSlot::Derived(DerivedVariable::Rand)) => {
                Some(GameValue::Float(self.next_rand()))
            }
            Some(VariableSlot::Derived(DerivedVariable::Appearance)) => {
                Some(GameValue::Int(self.appearance()))
            }
            _ => self.values.get(&key).cloned(),
        }
    }

    /// Script-level write. Read-only built-ins and derived names are rejected.
    pub fn set(&mut self, name: &str, value: GameValue) -> Result<(), IdleError> {
        if let Some(slot) = self.registry.lookup(name) {
            if !slot.is_writable() {
                return Err(IdleError::type_error(format!(
                    "Variable \"{}\" is read-only.",
                    name
                )));
            }
        }
        self.write(name, value)
    }

    /// Engine-level write that may target read-only built-ins.
    pub(crate) fn set_internal(&mut self, name: &str, value: GameValue) -> Result<(), IdleError> {
        if matches!(self.registry.lookup(name), Some(VariableSlot::Derived(_))) {
            return Err(IdleError::type_error(format!(
                "Variable \"{}\" is derived and cannot be stored.",
                name
            )));
        }
        self.write(name, value)
    }

    /// Puts back a saved built-in. Kinds are checked, ranges are not, so the
    /// order of restored values does not matter.
    pub(crate) fn restore_builtin(&mut self, name: &str, value: GameValue) -> Result<(), IdleError> {
        let Some(builtin) = self.registry.builtin(name) else {
            return Err(IdleError::new(
                "SNAPSHOT_UNKNOWN_VARIABLE",
                format!("Snapshot names unknown built-in \"{}\".", name),
            ));
        };
        if builtin.kind() != value.kind() {
            return Err(IdleError::new(
                "SNAPSHOT_TYPE_MISMATCH",
                format!(
                    "Snapshot gives {} for {} built-in \"{}\".",
                    value.type_name(),
                    builtin.kind().name(),
                    builtin.name
                ),
            ));
        }
        self.values.insert(builtin.key(), value);
        Ok(())
    }

    fn write(&mut self, name: &str, value: GameValue) -> Result<(), IdleError> {
        let key = name.to_ascii_lowercase();
        let value = match self.registry.builtin(&key) {
            Some(builtin) => self.checked_builtin_value(builtin, value)?,
            None => value,
        };
        self.values.insert(key, value);
        Ok(())
    }

    fn checked_builtin_value(
        &self,
        builtin: &BuiltinVariable,
        value: GameValue,
    ) -> Result<GameValue, IdleError> {
        if builtin.kind() != value.kind() {
            return Err(IdleError::type_error(format!(
                "Variable \"{}\" holds {} but was given {} \"{}\".",
                builtin.name,
                builtin.kind().name(),
                value.type_name(),
                value
            )));
        }
        let (Some(range), GameValue::Int(raw)) = (builtin.range, &value) else {
            return Ok(value);
        };
        let max = match range.max {
            UpperBound::Fixed(max) => max,
            UpperBound::Variable(other) => self.int(other),
        };
        Ok(GameValue::Int((*raw).min(max).max(range.min)))
    }

    pub fn int(&self, name: &str) -> i64 {
        self.get(name).map(|value| value.as_int()).unwrap_or(0)
    }

    pub fn bool(&self, name: &str) -> bool {
        self.get(name).map(|value| value.as_bool()).unwrap_or(false)
    }

    pub fn string(&self, name: &str) -> String {
        self.get(name)
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// `(fitness + charisma + mood) / 3 + routineBonus`, capped at 100.
    pub fn appearance(&self) -> i64 {
        let base = (self.int(names::FITNESS) + self.int(names::CHARISMA) + self.int(names::MOOD)) / 3;
        (base + self.int(names::ROUTINE_BONUS)).min(100)
    }

    fn next_rand(&self) -> f64 {
        let mut draw = 0;
        let _ = self
            .rng_state
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |state| {
                let mut next = state;
                draw = next_random_u32(&mut next);
                Some(next)
            });
        unit_interval(draw)
    }

    pub fn rng_state(&self) -> u32 {
        self.rng_state.load(Ordering::Relaxed)
    }

    pub(crate) fn set_rng_state(&mut self, state: u32) {
        *self.rng_state.get_mut() = state;
    }

    /// Every built-in keyed by canonical name.
    pub fn builtin_values(&self) -> BTreeMap<String, GameValue> {
        self.registry
            .builtins()
            .map(|builtin| {
                let value = self
                    .values
                    .get(&builtin.key())
                    .cloned()
                    .unwrap_or_else(|| builtin.default.clone());
                (builtin.name.to_string(), value)
            })
            .collect()
    }

    pub fn user_variables(&self) -> BTreeMap<String, GameValue> {
        self.values
            .iter()
            .filter(|(key, _)| self.registry.lookup(key).is_none())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
