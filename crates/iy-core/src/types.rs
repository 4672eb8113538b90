use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{CompareOp, GameValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self::line(1)
    }

    pub fn line(line: usize) -> Self {
        Self {
            start: SourceLocation { line, column: 1 },
            end: SourceLocation { line, column: 1 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptCondition {
    Literal {
        value: bool,
    },
    Compare {
        variable: String,
        operator: String,
        value: GameValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptAction {
    Print {
        text: String,
    },
    Show {
        image: String,
    },
    Assign {
        variable: String,
        operator: String,
        value: GameValue,
    },
}

/// Adds a persistent button when `target` is set, removes it otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptButton {
    pub label: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub target: String,
    pub conditions: Vec<ScriptCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub name: String,
    pub conditions: Vec<ScriptCondition>,
    pub actions: Vec<ScriptAction>,
    pub buttons: Vec<ScriptButton>,
    /// Keyed by label; a repeated label replaces the earlier choice in place.
    pub choices: Vec<Choice>,
    pub progress_max: u32,
    pub return_flag: bool,
    pub location: SourceSpan,
}

impl ScriptEvent {
    pub fn new(name: impl Into<String>, location: SourceSpan) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            actions: Vec::new(),
            buttons: Vec::new(),
            choices: Vec::new(),
            progress_max: 0,
            return_flag: false,
            location,
        }
    }

    pub fn insert_choice(&mut self, choice: Choice) {
        match self
            .choices
            .iter_mut()
            .find(|existing| existing.label == choice.label)
        {
            Some(existing) => *existing = choice,
            None => self.choices.push(choice),
        }
    }

    pub fn choice(&self, label: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.label == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Set,
    Add,
    Subtract,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Subtract => "-=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConditionIr {
    Literal {
        value: bool,
    },
    /// `variable` is already lower-cased.
    Compare {
        variable: String,
        op: CompareOp,
        value: GameValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EffectIr {
    Print {
        text: String,
    },
    Show {
        image: String,
    },
    Assign {
        variable: String,
        op: AssignOp,
        value: GameValue,
    },
    AddButton {
        label: String,
        target: String,
    },
    RemoveButton {
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceIr {
    pub label: String,
    pub target: String,
    pub guards: Vec<ConditionIr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventIr {
    pub name: String,
    pub conditions: Vec<ConditionIr>,
    /// Actions in script order followed by button mutations.
    pub effects: Vec<EffectIr>,
    pub choices: Vec<ChoiceIr>,
    pub progress_max: u32,
    pub return_flag: bool,
    pub source_path: String,
    pub location: SourceSpan,
}

impl EventIr {
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn choice(&self, label: &str) -> Option<&ChoiceIr> {
        self.choices.iter().find(|choice| choice.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSnapshot {
    pub event_name: String,
    pub text: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub schema_version: String,
    /// Every built-in variable by canonical name.
    pub values: BTreeMap<String, GameValue>,
    pub variables: BTreeMap<String, GameValue>,
    /// Newest first.
    pub messages: Vec<String>,
    pub buttons: BTreeMap<String, String>,
    pub done_events: Vec<String>,
    pub choice: Option<ChoiceSnapshot>,
    pub game_over: bool,
    pub rng_state: u32,
}
