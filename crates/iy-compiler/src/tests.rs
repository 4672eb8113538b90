use super::*;
use iy_core::error::{SCRIPT_SYNTAX, SCRIPT_TYPE, SCRIPT_UNKNOWN_OPERATOR};
use iy_core::{AssignOp, CompareOp, ConditionIr, EffectIr, GameValue};

fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn compile_script_lowers_conditions_and_effects() {
    let events = compile_script(
        "main.txt",
        r#"
=== Hungry
? Food < 50
? Working == false
! print You feel hungry.
! Mood -= 5
+ Eat -> Eat
- Nap
* Eat: Food < 50 -> Eat
> true
% 20
"#,
    )
    .expect("script should compile");

    assert_eq!(events.len(), 1);
    let hungry = &events[0];
    assert_eq!(hungry.source_path, "main.txt");
    assert_eq!(
        hungry.conditions,
        vec![
            ConditionIr::Compare {
                variable: "food".to_string(),
                op: CompareOp::Lt,
                value: GameValue::Int(50),
            },
            ConditionIr::Compare {
                variable: "working".to_string(),
                op: CompareOp::Eq,
                value: GameValue::Bool(false),
            },
        ]
    );
    assert_eq!(
        hungry.effects,
        vec![
            EffectIr::Print {
                text: "You feel hungry.".to_string()
            },
            EffectIr::Assign {
                variable: "mood".to_string(),
                op: AssignOp::Subtract,
                value: GameValue::Int(5),
            },
            EffectIr::AddButton {
                label: "Eat".to_string(),
                target: "Eat".to_string(),
            },
            EffectIr::RemoveButton {
                label: "Nap".to_string()
            },
        ]
    );
    let choice = hungry.choice("Eat").expect("eat choice");
    assert_eq!(choice.target, "Eat");
    assert_eq!(choice.guards.len(), 1);
    assert!(hungry.return_flag);
    assert_eq!(hungry.progress_max, 20);
}

#[test]
fn user_variables_accept_any_literal_kind() {
    let events = compile_script(
        "main.txt",
        r#"
=== Setup
? true
! metDog = yes
! counter += 1.5
"#,
    )
    .expect("script should compile");
    assert_eq!(events[0].effects.len(), 2);
}

#[test]
fn unknown_operators_are_rejected() {
    let error = compile_script("main.txt", "=== A\n? mood <> 5\n")
        .expect_err("comparison operator should be rejected");
    assert_eq!(error.code, SCRIPT_UNKNOWN_OPERATOR);
    assert_eq!(error.line(), Some(1));

    let error = compile_script("main.txt", "=== A\n! mood *= 5\n")
        .expect_err("assignment operator should be rejected");
    assert_eq!(error.code, SCRIPT_UNKNOWN_OPERATOR);
    assert!(error.message.contains("\"A\""));
}

#[test]
fn statically_known_type_errors_are_rejected() {
    let cases = [
        "=== A\n! mood += happy\n",
        "=== A\n! counter -= yes\n",
        "=== A\n! job += 1\n",
        "=== A\n! mood = 1.5\n",
        "=== A\n! working = 1\n",
        "=== A\n! eventValue = 3\n",
        "=== A\n! rand = 0.5\n",
    ];
    for source in cases {
        let error = compile_script("main.txt", source).expect_err(source);
        assert_eq!(error.code, SCRIPT_TYPE, "{}", source);
    }
}

#[test]
fn invalid_variable_names_are_syntax_errors() {
    for source in ["=== A\n? 9lives > 1\n", "=== A\n! my-var = 1\n"] {
        let error = compile_script("main.txt", source).expect_err(source);
        assert_eq!(error.code, SCRIPT_SYNTAX, "{}", source);
    }
}

#[test]
fn choice_guards_are_checked_like_conditions() {
    let error = compile_script("main.txt", "=== A\n* Go: mood =< 3 -> B\n")
        .expect_err("guard operator should be rejected");
    assert_eq!(error.code, SCRIPT_UNKNOWN_OPERATOR);
}

#[test]
fn bundle_skips_broken_sources_and_keeps_the_rest() {
    let files = map(&[
        ("a.txt", "=== First\n? true\n! print one\n"),
        ("b.txt", "=== Broken\n? mood ~ 3\n"),
        ("c.txt", "=== Second\n? ticks > 5\n"),
    ]);

    let result = compile_bundle_from_source_map(&files);
    let names = result
        .events
        .iter()
        .map(|event| event.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].path, "b.txt");
    assert_eq!(result.rejected[0].error.code, SCRIPT_UNKNOWN_OPERATOR);
}

#[test]
fn bundle_rejects_later_source_redeclaring_an_event() {
    let files = map(&[
        ("a.txt", "=== Shared\n? true\n"),
        ("b.txt", "=== Other\n? true\n=== Shared\n? false\n"),
    ]);

    let result = compile_bundle_from_source_map(&files);
    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].source_path, "a.txt");
    assert_eq!(result.rejected.len(), 1);
    let rejected = &result.rejected[0];
    assert_eq!(rejected.path, "b.txt");
    assert_eq!(rejected.error.code, SCRIPT_EVENT_DUPLICATE);
    assert_eq!(rejected.error.line(), Some(3));
}

#[test]
fn bundle_tolerates_unknown_targets() {
    let files = map(&[("a.txt", "=== A\n? true\n* Go -> Nowhere\n+ Press -> Missing\n")]);
    let result = compile_bundle_from_source_map(&files);
    assert!(result.rejected.is_empty());
    assert_eq!(result.events.len(), 1);
}
