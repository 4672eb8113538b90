use std::collections::BTreeSet;

use iy_core::{
    Choice, GameValue, IdleError, ScriptAction, ScriptButton, ScriptCondition, ScriptEvent,
    SourceSpan,
};

const ARROW: &str = "->";

/// Parses event definitions from DSL text.
///
/// ```text
/// === Go for a walk
/// ? mood <= 10
/// ? energy > 20
/// ! print You went outside for a walk to clear your head.
/// ! fitness += 10
/// > true
/// ```
pub fn parse_script(source: &str) -> Result<Vec<ScriptEvent>, IdleError> {
    let mut events = Vec::new();
    let mut names = BTreeSet::new();
    let mut current: Option<ScriptEvent> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("===") {
            let name = rest.trim();
            if name.is_empty() {
                return Err(IdleError::syntax("Event name must not be empty.", line_no));
            }
            if !names.insert(name.to_string()) {
                return Err(IdleError::syntax(
                    format!("Event \"{}\" is declared more than once.", name),
                    line_no,
                ));
            }
            if let Some(done) = current.take() {
                events.push(done);
            }
            current = Some(ScriptEvent::new(name, SourceSpan::line(line_no)));
            continue;
        }

        let mut chars = line.chars();
        let prefix = chars.next().unwrap_or_default();
        let rest = chars.as_str();

        let Some(event) = current.as_mut() else {
            return Err(IdleError::syntax(
                format!("Directive \"{}\" appears before any \"===\" event header.", line),
                line_no,
            ));
        };

        match prefix {
            '?' => event.conditions.push(parse_condition(rest, line_no)?),
            '!' => event.actions.push(parse_action(rest, line_no)?),
            '%' => event.progress_max = parse_progress_max(rest, line_no)?,
            '*' => event.insert_choice(parse_choice(rest, line_no)?),
            '+' => event.buttons.push(parse_button(rest, true, line_no)?),
            '-' => event.buttons.push(parse_button(rest, false, line_no)?),
            '>' => event.return_flag = parse_return_flag(rest, line_no)?,
            _ => {
                return Err(IdleError::syntax(
                    format!("Unrecognized line \"{}\".", line),
                    line_no,
                ))
            }
        }
    }

    if let Some(done) = current {
        events.push(done);
    }

    Ok(events)
}

/// `mood <= 10`, `status == very happy`, or a bare `true`/`false`.
pub fn parse_condition(text: &str, line: usize) -> Result<ScriptCondition, IdleError> {
    let parts = text.split_whitespace().collect::<Vec<_>>();
    match parts.len() {
        1 => match parts[0] {
            "true" => Ok(ScriptCondition::Literal { value: true }),
            "false" => Ok(ScriptCondition::Literal { value: false }),
            other => Err(IdleError::syntax(
                format!("Invalid boolean condition \"{}\".", other),
                line,
            )),
        },
        0..=2 => Err(IdleError::syntax(
            format!("Invalid condition syntax \"{}\".", text.trim()),
            line,
        )),
        _ => Ok(ScriptCondition::Compare {
            variable: parts[0].to_string(),
            operator: parts[1].to_string(),
            value: GameValue::from_literal(&parts[2..].join(" ")),
        }),
    }
}

/// `print <text>`, `show <image>`, or `<variable> <op> <value>`.
pub fn parse_action(text: &str, line: usize) -> Result<ScriptAction, IdleError> {
    let trimmed = text.trim();
    let parts = trimmed.split_whitespace().collect::<Vec<_>>();
    if parts.len() < 2 {
        return Err(IdleError::syntax(
            format!("Invalid action syntax \"{}\".", trimmed),
            line,
        ));
    }

    let payload = || trimmed[parts[0].len()..].trim().to_string();
    match parts[0] {
        "print" => return Ok(ScriptAction::Print { text: payload() }),
        "show" => return Ok(ScriptAction::Show { image: payload() }),
        _ => {}
    }

    if parts.len() < 3 {
        return Err(IdleError::syntax(
            format!("Invalid action syntax \"{}\".", trimmed),
            line,
        ));
    }

    Ok(ScriptAction::Assign {
        variable: parts[0].to_string(),
        operator: parts[1].to_string(),
        value: GameValue::from_literal(&parts[2..].join(" ")),
    })
}

/// `money >= 10, mood > 5: Buy a drink -> Bar` or `Leave -> Home`.
pub fn parse_choice(text: &str, line: usize) -> Result<Choice, IdleError> {
    let Some((head, target)) = text.split_once(ARROW) else {
        return Err(IdleError::syntax(
            format!("Invalid choice syntax \"{}\": missing \"->\".", text.trim()),
            line,
        ));
    };

    let (guards, label) = match head.split_once(':') {
        Some((guards, label)) => (Some(guards), label),
        None => (None, head),
    };

    let mut conditions = Vec::new();
    if let Some(guards) = guards {
        for guard in guards.split(',') {
            conditions.push(parse_condition(guard, line)?);
        }
    }

    let label = label.trim();
    let target = target.trim();
    if label.is_empty() || target.is_empty() {
        return Err(IdleError::syntax(
            format!("Choice \"{}\" needs a label and a target event.", text.trim()),
            line,
        ));
    }

    Ok(Choice {
        label: label.to_string(),
        target: target.to_string(),
        conditions,
    })
}

/// `Label -> Event` when adding, a bare `Label` when removing.
pub fn parse_button(text: &str, add: bool, line: usize) -> Result<ScriptButton, IdleError> {
    let button = match (add, text.split_once(ARROW)) {
        (true, Some((label, target))) => ScriptButton {
            label: label.trim().to_string(),
            target: Some(target.trim().to_string()),
        },
        (true, None) => {
            return Err(IdleError::syntax(
                format!("Invalid button syntax \"{}\": missing \"->\".", text.trim()),
                line,
            ))
        }
        (false, Some(_)) => {
            return Err(IdleError::syntax(
                format!("Button removal \"{}\" takes only a label.", text.trim()),
                line,
            ))
        }
        (false, None) => ScriptButton {
            label: text.trim().to_string(),
            target: None,
        },
    };

    if button.label.is_empty() || button.target.as_deref() == Some("") {
        return Err(IdleError::syntax(
            format!("Invalid button syntax \"{}\".", text.trim()),
            line,
        ));
    }
    Ok(button)
}

fn parse_progress_max(text: &str, line: usize) -> Result<u32, IdleError> {
    text.trim().parse::<u32>().map_err(|_| {
        IdleError::syntax(
            format!("Invalid progress length \"{}\".", text.trim()),
            line,
        )
    })
}

fn parse_return_flag(text: &str, line: usize) -> Result<bool, IdleError> {
    match text.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(IdleError::syntax(
            format!("Invalid return flag \"{}\".", other),
            line,
        )),
    }
}
