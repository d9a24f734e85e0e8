use edit_command::{
    ChoiceAction, ChooseMany, Command, Continuation, ElementRef, FileContent, FileRef, Fragment,
    OptionsFactory, SelectionMode, StartTemplate, TemplateField, TextRange,
};
use edit_command_exec::{
    BatchExecutionResult, BatchExecutor, ExecutorConfig, OptionStore, OwnerToken, Workspace,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn file(path: &str) -> FileRef {
    FileRef::new(path)
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn run(workspace: &mut Workspace, command: Command) -> BatchExecutionResult {
    BatchExecutor::default().execute(&OwnerToken::new(), workspace, command)
}

/// Records the chosen value as option `chosen`.
fn record_choice<T: serde::Serialize>(value: T) -> Command {
    Command::update_option("chosen", Value::Null, json!(value))
}

#[test]
fn test_choose_many_runs_continuation_with_defaults() {
    let mut workspace = Workspace::new();
    let choose = ChooseMany::new(
        "Members",
        names(&["A", "B", "C"]),
        names(&["A", "B"]),
        SelectionMode::Multiple,
        Continuation::new(record_choice),
    )
    .unwrap();

    let result = run(&mut workspace, Command::ChooseMany(choose));

    assert_eq!(result, BatchExecutionResult::Success);
    assert_eq!(workspace.option("chosen"), Some(json!(["A", "B"])));
}

#[test]
fn test_choose_many_defaults_outside_mode_need_a_user() {
    let mut workspace = Workspace::new();
    let choose = ChooseMany::new(
        "Member",
        names(&["A", "B"]),
        names(&["A", "B"]),
        SelectionMode::Single,
        Continuation::new(record_choice),
    )
    .unwrap();

    let result = run(&mut workspace, Command::ChooseMany(choose));

    assert_eq!(result, BatchExecutionResult::Interactive);
    assert_eq!(workspace.option("chosen"), None);
}

#[test]
fn test_insertion_between_braces() {
    let target = file("a.txt");
    let mut workspace = Workspace::new().with_text("a.txt", "a{}b");
    let command =
        Command::update_text(target.clone(), "a{}b", "a{ }b", vec![Fragment::new(2, 0, 1)])
            .unwrap();

    let Command::UpdateText(update) = &command else {
        panic!("expected a text update");
    };
    assert_eq!(update.patch().translate_offset(2, false), 2);
    assert_eq!(update.patch().translate_offset(2, true), 3);

    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
    assert_eq!(workspace.text(&target).as_deref(), Some("a{ }b"));
}

#[test]
fn test_stale_update_aborts_and_leaves_target_unmodified() {
    let target = file("a.txt");
    let mut workspace = Workspace::new().with_text("a.txt", "live text");
    let version = workspace.version();

    let result = run(
        &mut workspace,
        Command::replace_text(target.clone(), "stale text", "new text"),
    );

    assert_eq!(result, BatchExecutionResult::Abort);
    assert_eq!(workspace.text(&target).as_deref(), Some("live text"));
    assert_eq!(workspace.version(), version);
}

#[test]
fn test_abort_happens_before_any_mutation() {
    let mut workspace = Workspace::new()
        .with_text("a.txt", "one")
        .with_text("b.txt", "live");
    let command = Command::replace_text(file("a.txt"), "one", "two")
        .and_then(Command::update_option("tab", Value::Null, json!(2)))
        .and_then(Command::replace_text(file("b.txt"), "stale", "new"));

    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Abort);
    assert_eq!(workspace.text(&file("a.txt")).as_deref(), Some("one"));
    assert_eq!(workspace.option("tab"), None);
}

#[test]
fn test_non_mergeable_chain_keeps_order_and_aborts() {
    let target = file("a.txt");
    let first = Command::replace_text(target.clone(), "one", "two");
    let second = Command::replace_text(target.clone(), "one", "three");
    assert_eq!(first.try_merge(&second), None);

    let chained = first.clone().and_then(second.clone());
    assert_eq!(chained.clone().merge_adjacent().unpack(), vec![first, second]);

    let mut workspace = Workspace::new().with_text("a.txt", "one");
    assert_eq!(run(&mut workspace, chained), BatchExecutionResult::Abort);
    assert_eq!(workspace.text(&target).as_deref(), Some("one"));
}

#[test]
fn test_chained_updates_apply_in_order_without_merging() {
    let target = file("a.txt");
    let config = ExecutorConfig {
        merge_adjacent_updates: false,
        ..ExecutorConfig::default()
    };
    let mut workspace = Workspace::new().with_text("a.txt", "one");
    let command = Command::replace_text(target.clone(), "one", "two")
        .and_then(Command::replace_text(target.clone(), "two", "three"));

    let result = BatchExecutor::new(config).execute(&OwnerToken::new(), &mut workspace, command);

    assert_eq!(result, BatchExecutionResult::Success);
    assert_eq!(workspace.text(&target).as_deref(), Some("three"));
}

#[test]
fn test_options_require_expected_old_value() {
    let mut workspace = Workspace::new().with_option("tab", json!(4));

    let stale = Command::update_option("tab", json!(8), json!(2));
    assert_eq!(run(&mut workspace, stale), BatchExecutionResult::Abort);
    assert_eq!(workspace.option("tab"), Some(json!(4)));

    let chained = Command::update_option("tab", json!(4), json!(2))
        .and_then(Command::update_option("tab", json!(2), json!(8)));
    assert_eq!(run(&mut workspace, chained), BatchExecutionResult::Success);
    assert_eq!(workspace.option("tab"), Some(json!(8)));
}

#[test]
fn test_missing_option_compares_as_null() {
    let mut workspace = Workspace::new();
    let command = Command::update_option("wrap", Value::Null, json!(true));
    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
    assert_eq!(workspace.option("wrap"), Some(json!(true)));
}

#[test]
fn test_file_operation_failures_halt_execution() {
    let mut workspace = Workspace::new().with_text("a.txt", "a");

    let command = Command::create_file(file(""), "a.txt", FileContent::Text(String::new()))
        .and_then(Command::update_option("after", Value::Null, json!(1)));
    assert_eq!(
        run(&mut workspace, command),
        BatchExecutionResult::Error("file `a.txt` already exists".into())
    );
    assert_eq!(workspace.option("after"), None);

    let command = Command::delete_file(file("missing.txt"));
    assert_eq!(
        run(&mut workspace, command),
        BatchExecutionResult::Error("file `missing.txt` not found".into())
    );

    let command = Command::move_file(file("missing.txt"), file("b.txt"));
    assert!(matches!(run(&mut workspace, command), BatchExecutionResult::Error(_)));
}

#[test]
fn test_created_file_can_be_edited_in_the_same_command() {
    let mut workspace = Workspace::new().with_directory("src");
    let created = file("src/lib.rs");
    let command = Command::create_file(file("src"), "lib.rs", FileContent::Text("fn a() {}".into()))
        .and_then(Command::replace_text(created.clone(), "fn a() {}", "fn b() {}"));

    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
    assert_eq!(workspace.text(&created).as_deref(), Some("fn b() {}"));
}

#[test]
fn test_choose_one_takes_first_action_or_declines() {
    let command = Command::choose_one(
        "Fix",
        vec![
            ChoiceAction::new("first", record_choice("first")),
            ChoiceAction::new("second", record_choice("second")),
        ],
    );

    let mut workspace = Workspace::new();
    assert_eq!(run(&mut workspace, command.clone()), BatchExecutionResult::Success);
    assert_eq!(workspace.option("chosen"), Some(json!("first")));

    let config = ExecutorConfig {
        batch_choose_first: false,
        ..ExecutorConfig::default()
    };
    let mut workspace = Workspace::new();
    let result = BatchExecutor::new(config).execute(&OwnerToken::new(), &mut workspace, command);
    assert_eq!(result, BatchExecutionResult::Interactive);
    assert_eq!(workspace.option("chosen"), None);
}

#[test]
fn test_command_after_choice_runs_after_the_continuation() {
    let mut workspace = Workspace::new();
    let command = Command::choose_one(
        "Fix",
        vec![ChoiceAction::new("only", Command::update_option("step", Value::Null, json!(1)))],
    )
    .and_then(Command::update_option("step", json!(1), json!(2)));

    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
    assert_eq!(workspace.option("step"), Some(json!(2)));
}

#[test]
fn test_edit_options_uses_defaults_only_when_allowed() {
    let factory = OptionsFactory::new(|| json!({ "name": "helper" }));

    let mut workspace = Workspace::new();
    let allowed = Command::edit_options("Extract", factory.clone(), true, Continuation::new(record_choice));
    assert_eq!(run(&mut workspace, allowed), BatchExecutionResult::Success);
    assert_eq!(workspace.option("chosen"), Some(json!({ "name": "helper" })));

    let mut workspace = Workspace::new();
    let refused = Command::edit_options("Extract", factory, false, Continuation::new(record_choice));
    assert_eq!(run(&mut workspace, refused), BatchExecutionResult::Interactive);
}

#[test]
fn test_conflicts_stop_batch_execution() {
    let mut conflicts = BTreeMap::new();
    conflicts.insert(
        ElementRef {
            file: file("a.rs"),
            range: TextRange::new(0, 3),
        },
        vec!["name is already used".to_string()],
    );
    let mut workspace = Workspace::new();
    let command = Command::show_conflicts(conflicts)
        .and_then(Command::update_option("after", Value::Null, json!(1)));

    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Conflicts);
    assert_eq!(workspace.option("after"), None);

    let command = Command::show_conflicts(BTreeMap::new())
        .and_then(Command::update_option("after", Value::Null, json!(1)));
    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
}

#[test]
fn test_messages_in_batch() {
    let mut workspace = Workspace::new();
    assert_eq!(run(&mut workspace, Command::info("done")), BatchExecutionResult::Success);
    assert!(workspace.messages().is_empty());

    let command = Command::error("cannot inline recursive function")
        .and_then(Command::update_option("after", Value::Null, json!(1)));
    assert_eq!(
        run(&mut workspace, command),
        BatchExecutionResult::Error("cannot inline recursive function".into())
    );
    assert_eq!(workspace.option("after"), None);
}

#[test]
fn test_navigation_and_rename_are_skipped() {
    let target = file("a.txt");
    let mut workspace = Workspace::new().with_text("a.txt", "hello");
    workspace.open_session(&target).unwrap();

    let command = Command::caret(target.clone(), 3)
        .and_then(Command::rename(target.clone(), TextRange::new(0, 5), vec![]));
    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
    assert_eq!(workspace.session(&target).map(|s| s.version()), Some(0));
}

#[test]
fn test_reference_update_rewrites_call_sites() {
    let lib = file("lib.rs");
    let main = file("main.rs");
    let mut workspace = Workspace::new()
        .with_text("lib.rs", "fn sum(a: i32) {}")
        .with_text("main.rs", "fn main() { sum(1); }");

    let command = Command::replace_text(lib.clone(), "fn sum(a: i32) {}", "fn total(a: i32) {}")
        .and_then(Command::update_references(
            lib.clone(),
            "fn sum(a: i32) {}",
            TextRange::new(0, 17),
            TextRange::new(0, 19),
        ));

    assert_eq!(run(&mut workspace, command), BatchExecutionResult::Success);
    assert_eq!(workspace.text(&lib).as_deref(), Some("fn total(a: i32) {}"));
    assert_eq!(workspace.text(&main).as_deref(), Some("fn main() { total(1); }"));
}

#[test]
fn test_execute_all_combines_results() {
    let executor = BatchExecutor::default();
    let owner = OwnerToken::new();
    let mut workspace = Workspace::new().with_text("a.txt", "x");

    let result = executor.execute_all(
        &owner,
        &mut workspace,
        [
            Command::replace_text(file("a.txt"), "x", "y"),
            Command::nop(),
            Command::replace_text(file("a.txt"), "x", "z"),
        ],
    );
    assert_eq!(result, BatchExecutionResult::Abort);
    assert_eq!(workspace.text(&file("a.txt")).as_deref(), Some("y"));

    let result = executor.execute_all(&owner, &mut workspace, Vec::new());
    assert_eq!(result, BatchExecutionResult::Nothing);
    assert_eq!(executor.execute(&owner, &mut workspace, Command::nop()), BatchExecutionResult::Nothing);
}

#[test]
fn test_template_defaults_follow_dependent_chains() {
    let target = file("a.rs");
    let mut workspace = Workspace::new().with_text("a.rs", "a_c_b");
    let template = StartTemplate::new(
        target.clone(),
        vec![
            TemplateField::Expression {
                range: TextRange::new(0, 1),
                name: "a".into(),
                default: "x".into(),
            },
            TemplateField::Dependent {
                range: TextRange::new(2, 3),
                name: "c".into(),
                source: "b".into(),
            },
            TemplateField::Dependent {
                range: TextRange::new(4, 5),
                name: "b".into(),
                source: "a".into(),
            },
        ],
        Continuation::constant(Command::nop()),
    )
    .unwrap();

    assert_eq!(run(&mut workspace, template.into()), BatchExecutionResult::Success);
    assert_eq!(workspace.text(&target).as_deref(), Some("x_x_x"));
}
