use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::value::{GameValue, ValueKind};

/// Lower-cased keys of the built-in variables the engine reads and writes.
pub mod names {
    pub const TICKS: &str = "ticks";
    pub const WORK: &str = "work";
    pub const WORK_XP: &str = "workxp";
    pub const FOOD: &str = "food";
    pub const FOOD_MAX: &str = "foodmax";
    pub const ENERGY: &str = "energy";
    pub const ENERGY_MAX: &str = "energymax";
    pub const MOOD: &str = "mood";
    pub const MONEY: &str = "money";
    pub const CHARISMA: &str = "charisma";
    pub const FITNESS: &str = "fitness";
    pub const JOB: &str = "job";
    pub const SALARY: &str = "salary";
    pub const WORKING: &str = "working";
    pub const PAUSED: &str = "paused";
    pub const ROUTINE_SHOWER: &str = "routineshower";
    pub const ROUTINE_SHAVE: &str = "routineshave";
    pub const ROUTINE_BRUSH_TEETH: &str = "routinebrushteeth";
    pub const ROUTINE_BONUS: &str = "routinebonus";
    pub const EVENT_NAME: &str = "eventname";
    pub const EVENT_VALUE: &str = "eventvalue";
    pub const EVENT_MAX: &str = "eventmax";
    pub const RAND: &str = "rand";
    pub const APPEARANCE: &str = "appearance";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    Fixed(i64),
    /// Upper bound read from another built-in at assignment time.
    Variable(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePolicy {
    pub min: i64,
    pub max: UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    /// Maintained by the engine; scripts may read but not assign.
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinVariable {
    /// Canonical spelling used in snapshots.
    pub name: &'static str,
    pub default: GameValue,
    pub range: Option<RangePolicy>,
    pub access: Access,
}

impl BuiltinVariable {
    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedVariable {
    Rand,
    Appearance,
}

impl DerivedVariable {
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Rand => ValueKind::Float,
            Self::Appearance => ValueKind::Int,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariableSlot {
    Stored(BuiltinVariable),
    Derived(DerivedVariable),
}

impl VariableSlot {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Stored(builtin) => builtin.kind(),
            Self::Derived(derived) => derived.kind(),
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Self::Stored(BuiltinVariable {
                access: Access::ReadWrite,
                ..
            })
        )
    }
}

#[derive(Debug)]
pub struct VariableRegistry {
    slots: BTreeMap<String, VariableSlot>,
}

impl VariableRegistry {
    pub fn standard() -> &'static VariableRegistry {
        static REGISTRY: OnceLock<VariableRegistry> = OnceLock::new();
        REGISTRY.get_or_init(build_standard)
    }

    pub fn lookup(&self, name: &str) -> Option<&VariableSlot> {
        self.slots.get(&name.to_ascii_lowercase())
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinVariable> {
        match self.lookup(name) {
            Some(VariableSlot::Stored(builtin)) => Some(builtin),
            _ => None,
        }
    }

    pub fn builtins(&self) -> impl Iterator<Item = &BuiltinVariable> {
        self.slots.values().filter_map(|slot| match slot {
            VariableSlot::Stored(builtin) => Some(builtin),
            VariableSlot::Derived(_) => None,
        })
    }
}

fn build_standard() -> VariableRegistry {
    let percent = Some(RangePolicy {
        min: 0,
        max: UpperBound::Fixed(100),
    });
    let builtins = [
        stored("ticks", GameValue::Int(0), None),
        stored("work", GameValue::Int(0), percent),
        stored("workXP", GameValue::Int(0), None),
        stored("food", GameValue::Int(200), None),
        stored("foodMax", GameValue::Int(200), None),
        stored(
            "energy",
            GameValue::Int(100),
            Some(RangePolicy {
                min: 0,
                max: UpperBound::Variable(names::ENERGY_MAX),
            }),
        ),
        stored("energyMax", GameValue::Int(100), None),
        stored("mood", GameValue::Int(50), percent),
        stored("money", GameValue::Int(100), None),
        stored("charisma", GameValue::Int(0), percent),
        stored("fitness", GameValue::Int(0), percent),
        stored("job", GameValue::from(""), None),
        stored("salary", GameValue::Int(0), None),
        stored("working", GameValue::Bool(false), None),
        stored("paused", GameValue::Bool(false), None),
        stored("routineShower", GameValue::Bool(true), None),
        stored("routineShave", GameValue::Bool(false), None),
        stored("routineBrushTeeth", GameValue::Bool(true), None),
        stored("routineBonus", GameValue::Int(0), None),
        read_only("eventName", GameValue::from("")),
        read_only("eventValue", GameValue::Int(0)),
        read_only("eventMax", GameValue::Int(100)),
    ];

    let mut slots = BTreeMap::new();
    for builtin in builtins {
        slots.insert(builtin.key(), VariableSlot::Stored(builtin));
    }
    slots.insert(
        names::RAND.to_string(),
        VariableSlot::Derived(DerivedVariable::Rand),
    );
    slots.insert(
        names::APPEARANCE.to_string(),
        VariableSlot::Derived(DerivedVariable::Appearance),
    );
    VariableRegistry { slots }
}

fn stored(name: &'static str, default: GameValue, range: Option<RangePolicy>) -> BuiltinVariable {
    BuiltinVariable {
        name,
        default,
        range,
        access: Access::ReadWrite,
    }
}

fn read_only(name: &'static str, default: GameValue) -> BuiltinVariable {
    BuiltinVariable {
        name,
        default,
        range: None,
        access: Access::ReadOnly,
    }
}
