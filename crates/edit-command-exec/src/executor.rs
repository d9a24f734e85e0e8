//! The run loop shared by the batch and interactive executors.
//!
//! Leaves execute in order. Before the first leaf of every segment (the leaves up to the next
//! step whose follow-up is not known yet), the text and option preconditions of the whole
//! segment are checked against a simulated view of the live state, so a stale command aborts
//! before anything is mutated.

use crate::config::ExecutorConfig;
use crate::host::{Host, translate_session};
use crate::interactive::Interaction;
use crate::references;
use crate::result::BatchExecutionResult;
use edit_command::{
    Command, FileContent, FileRef, MessageKind, Navigate, RenameRequest, StartTemplate,
    TemplateValues, TextRange, UpdateText,
};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

/// How steps that need a user are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Policy {
    Batch,
    Interactive,
}

/// Where a run stopped.
#[derive(Debug)]
pub(crate) enum RunOutcome {
    Finished(BatchExecutionResult),
    Suspended {
        interaction: Interaction,
        leaf: Command,
        rest: Vec<Command>,
    },
}

enum Step {
    Done,
    Expand(Command),
    Suspend(Interaction),
    Stop(BatchExecutionResult),
}

pub(crate) struct Run<'a, H: Host + ?Sized> {
    host: &'a mut H,
    config: &'a ExecutorConfig,
    policy: Policy,
}

impl<'a, H: Host + ?Sized> Run<'a, H> {
    pub(crate) fn new(host: &'a mut H, config: &'a ExecutorConfig, policy: Policy) -> Self {
        Self {
            host,
            config,
            policy,
        }
    }

    /// Prepare a command for a run: optionally merge adjacent updates, then flatten.
    pub(crate) fn leaves(&self, command: Command) -> VecDeque<Command> {
        let command = if self.config.merge_adjacent_updates {
            command.merge_adjacent()
        } else {
            command
        };
        command.into_leaves().into()
    }

    pub(crate) fn run(&mut self, mut queue: VecDeque<Command>) -> RunOutcome {
        let _span = tracing::debug_span!("run", policy = ?self.policy, leaves = queue.len()).entered();
        let mut segment_checked = false;

        while let Some(leaf) = queue.pop_front() {
            if !segment_checked {
                if let Err(result) = self.preflight(std::iter::once(&leaf).chain(queue.iter())) {
                    tracing::debug!(%result, "segment rejected before mutation");
                    return RunOutcome::Finished(result);
                }
                segment_checked = true;
            }
            if self.is_break(&leaf) {
                segment_checked = false;
            }

            tracing::trace!(kind = leaf.kind_name(), "executing leaf");
            match self.step(&leaf) {
                Step::Done => {}
                Step::Expand(next) => {
                    for command in self.leaves(next).into_iter().rev() {
                        queue.push_front(command);
                    }
                }
                Step::Suspend(interaction) => {
                    tracing::debug!(kind = leaf.kind_name(), "suspending for user interaction");
                    return RunOutcome::Suspended {
                        interaction,
                        leaf,
                        rest: queue.into(),
                    };
                }
                Step::Stop(result) => {
                    tracing::debug!(%result, kind = leaf.kind_name(), "execution stopped");
                    return RunOutcome::Finished(result);
                }
            }
        }
        RunOutcome::Finished(BatchExecutionResult::Success)
    }

    /// Leaves whose follow-up is only known once they run.
    fn is_break(&self, leaf: &Command) -> bool {
        match leaf {
            Command::ChooseOne(_)
            | Command::ChooseMany(_)
            | Command::EditOptions(_)
            | Command::StartTemplate(_)
            | Command::UpdateReferences(_) => true,
            Command::ShowConflicts(_) | Command::RenameRequest(_) => {
                self.policy == Policy::Interactive
            }
            _ => false,
        }
    }

    /// Check every text and option precondition up to the next break.
    fn preflight<'c>(
        &self,
        leaves: impl Iterator<Item = &'c Command>,
    ) -> Result<(), BatchExecutionResult> {
        let mut texts: BTreeMap<FileRef, Option<String>> = BTreeMap::new();
        let mut options: BTreeMap<&str, Value> = BTreeMap::new();

        for leaf in leaves {
            match leaf {
                Command::UpdateText(update) => {
                    let target = update.target();
                    let current = texts
                        .entry(target.clone())
                        .or_insert_with(|| self.host.content(target));
                    match current {
                        None => return Err(missing(target)),
                        Some(text) if text.as_str() != update.old_text() => {
                            tracing::debug!(file = %target, "text precondition mismatch");
                            return Err(BatchExecutionResult::Abort);
                        }
                        Some(text) => *text = update.new_text().to_string(),
                    }
                }
                Command::CreateFile(create) => {
                    let content = match &create.content {
                        FileContent::Text(text) => Some(text.clone()),
                        FileContent::Binary(_) | FileContent::Directory => None,
                    };
                    texts.insert(create.path(), content);
                }
                Command::DeleteFile(delete) => {
                    texts.insert(delete.target.clone(), None);
                }
                Command::MoveFile(moved) => {
                    let content = texts
                        .remove(&moved.target)
                        .unwrap_or_else(|| self.host.content(&moved.target));
                    texts.insert(moved.target.clone(), None);
                    texts.insert(moved.destination.clone(), content);
                }
                Command::UpdateOptions(updates) => {
                    for update in updates {
                        let current = options
                            .get(update.id.as_str())
                            .cloned()
                            .or_else(|| self.host.option(&update.id))
                            .unwrap_or(Value::Null);
                        if current != update.old_value {
                            tracing::debug!(option = %update.id, "option precondition mismatch");
                            return Err(BatchExecutionResult::Abort);
                        }
                        options.insert(update.id.as_str(), update.new_value.clone());
                    }
                }
                leaf if self.is_break(leaf) => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn step(&mut self, leaf: &Command) -> Step {
        let interactive = self.policy == Policy::Interactive;
        match leaf {
            Command::UpdateText(update) => self.apply_update(update),
            Command::CreateFile(create) => {
                hard(self.host.create_file(&create.path(), &create.content))
            }
            Command::DeleteFile(delete) => hard(self.host.delete_file(&delete.target)),
            Command::MoveFile(moved) => {
                hard(self.host.move_file(&moved.target, &moved.destination))
            }
            Command::Navigate(navigate) => {
                if interactive {
                    self.navigate(navigate);
                }
                Step::Done
            }
            Command::Highlight(highlight) => {
                if interactive {
                    if let Some(session) = self.host.session_mut(&highlight.target) {
                        let mut highlights = session.highlights().to_vec();
                        highlights.extend(highlight.ranges.iter().copied());
                        session.set_highlights(highlights);
                    }
                }
                Step::Done
            }
            Command::Message(message) => {
                if interactive {
                    self.host.show_message(&message.text, message.kind);
                } else {
                    tracing::info!(kind = ?message.kind, text = %message.text, "message");
                }
                match message.kind {
                    MessageKind::Error => Step::Stop(BatchExecutionResult::Error(message.text.clone())),
                    MessageKind::Info => Step::Done,
                }
            }
            Command::ShowConflicts(conflicts) => {
                if conflicts.conflicts.is_empty() {
                    Step::Done
                } else if interactive {
                    Step::Suspend(Interaction::ShowConflicts {
                        conflicts: conflicts.conflicts.clone(),
                    })
                } else {
                    Step::Stop(BatchExecutionResult::Conflicts)
                }
            }
            Command::ChooseOne(choose) => {
                if interactive {
                    Step::Suspend(Interaction::ChooseOne {
                        title: choose.title.clone(),
                        actions: choose.actions.iter().map(|a| a.name.clone()).collect(),
                    })
                } else if !self.config.batch_choose_first {
                    Step::Stop(BatchExecutionResult::Interactive)
                } else {
                    match choose.actions.first() {
                        Some(action) => Step::Expand(action.continuation.resolve(())),
                        None => Step::Done,
                    }
                }
            }
            Command::ChooseMany(choose) => {
                if interactive {
                    Step::Suspend(Interaction::ChooseMany {
                        title: choose.title().to_string(),
                        candidates: choose.candidates().to_vec(),
                        default_selection: choose.default_selection().to_vec(),
                        mode: choose.mode(),
                    })
                } else if self.config.batch_accept_defaults
                    && choose.mode().accepts(choose.default_selection().len())
                {
                    Step::Expand(
                        choose
                            .continuation()
                            .resolve(choose.default_selection().to_vec()),
                    )
                } else {
                    Step::Stop(BatchExecutionResult::Interactive)
                }
            }
            Command::EditOptions(options) => {
                if interactive {
                    Step::Suspend(Interaction::EditOptions {
                        title: options.title.clone(),
                        defaults: options.factory.create(),
                    })
                } else if self.config.batch_accept_defaults && options.allow_defaults_in_batch {
                    Step::Expand(options.continuation.resolve(options.factory.create()))
                } else {
                    Step::Stop(BatchExecutionResult::Interactive)
                }
            }
            Command::StartTemplate(template) => {
                if interactive {
                    Step::Suspend(Interaction::Template {
                        target: template.target().clone(),
                        fields: template.fields().to_vec(),
                    })
                } else {
                    let values = template.default_values();
                    match fill_template(&*self.host, template, &values) {
                        Ok(fill) => Step::Expand(fill.and_then(template.continuation().resolve(values))),
                        Err(result) => Step::Stop(result),
                    }
                }
            }
            Command::RenameRequest(rename) => {
                if interactive {
                    Step::Suspend(Interaction::Rename {
                        target: rename.target.clone(),
                        range: rename.range,
                        suggestions: rename.suggestions.clone(),
                    })
                } else {
                    Step::Done
                }
            }
            Command::UpdateOptions(updates) => {
                for update in updates {
                    let current = self.host.option(&update.id).unwrap_or(Value::Null);
                    if current != update.old_value {
                        return Step::Stop(BatchExecutionResult::Abort);
                    }
                    self.host.set_option(&update.id, update.new_value.clone());
                }
                Step::Done
            }
            Command::UpdateReferences(update) => {
                Step::Expand(references::propagate(&*self.host, update))
            }
            Command::Composite(_) => Step::Expand(leaf.clone()),
            Command::Nop => Step::Done,
        }
    }

    fn apply_update(&mut self, update: &UpdateText) -> Step {
        let target = update.target();
        match self.host.content(target) {
            None => return Step::Stop(missing(target)),
            Some(live) if live != update.old_text() => {
                tracing::warn!(file = %target, "live text changed before apply");
                return Step::Stop(BatchExecutionResult::Abort);
            }
            Some(_) => {}
        }
        if let Err(err) = self.host.apply_patch(target, update.patch()) {
            return Step::Stop(BatchExecutionResult::Error(err.to_string()));
        }
        if self.policy == Policy::Interactive && self.config.translate_sessions {
            if let Some(session) = self.host.session_mut(target) {
                translate_session(session, update.patch());
            }
        }
        Step::Done
    }

    fn navigate(&mut self, navigate: &Navigate) {
        let len = self.host.char_len(&navigate.target).unwrap_or(0);
        let Some(session) = self.host.session_mut(&navigate.target) else {
            tracing::trace!(file = %navigate.target, "no session, navigation skipped");
            return;
        };
        if navigate.selection_start.is_some() || navigate.selection_end.is_some() {
            let current = session
                .selection()
                .unwrap_or_else(|| TextRange::empty(session.caret()));
            let start = navigate.selection_start.unwrap_or(current.start).min(len);
            let end = navigate.selection_end.unwrap_or(current.end).min(len);
            session.set_selection(Some(TextRange::new(start, end)));
        }
        if let Some(caret) = navigate.caret {
            session.set_caret(caret.min(len));
        }
    }
}

fn hard(result: Result<(), crate::host::HostError>) -> Step {
    match result {
        Ok(()) => Step::Done,
        Err(err) => Step::Stop(BatchExecutionResult::Error(err.to_string())),
    }
}

fn missing(file: &FileRef) -> BatchExecutionResult {
    BatchExecutionResult::Error(format!("file `{file}` not found"))
}

/// Write template values into the field ranges of the live target text.
pub(crate) fn fill_template<H: Host + ?Sized>(
    host: &H,
    template: &StartTemplate,
    values: &TemplateValues,
) -> Result<Command, BatchExecutionResult> {
    let target = template.target();
    let live = host.content(target).ok_or_else(|| missing(target))?;
    let chars: Vec<char> = live.chars().collect();

    let mut filled = String::with_capacity(live.len());
    let mut cursor = 0;
    for field in template.fields() {
        let range = field.range();
        if range.start < cursor || range.end > chars.len() {
            return Err(BatchExecutionResult::Error(format!(
                "template field `{}` is outside `{target}`",
                field.name()
            )));
        }
        filled.extend(&chars[cursor..range.start]);
        match values.get(field.name()) {
            Some(value) => filled.push_str(value),
            None => filled.extend(&chars[range.start..range.end]),
        }
        cursor = range.end;
    }
    filled.extend(&chars[cursor..]);
    Ok(Command::replace_text(target.clone(), live, filled))
}

/// Replace the renamed range with `name` in the live target text.
pub(crate) fn fill_rename<H: Host + ?Sized>(
    host: &H,
    rename: &RenameRequest,
    name: &str,
) -> Result<Command, BatchExecutionResult> {
    let live = host
        .content(&rename.target)
        .ok_or_else(|| missing(&rename.target))?;
    let chars: Vec<char> = live.chars().collect();
    if rename.range.end > chars.len() {
        return Err(BatchExecutionResult::Error(format!(
            "rename range is outside `{}`",
            rename.target
        )));
    }
    let mut renamed: String = chars[..rename.range.start].iter().collect();
    renamed.push_str(name);
    renamed.extend(&chars[rename.range.end..]);
    Ok(Command::replace_text(rename.target.clone(), live, renamed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Workspace;
    use edit_command::{Continuation, TemplateField};
    use tracing_test::traced_test;

    fn run_batch(workspace: &mut Workspace, command: Command) -> BatchExecutionResult {
        let config = ExecutorConfig::default();
        let mut run = Run::new(workspace, &config, Policy::Batch);
        let queue = run.leaves(command);
        match run.run(queue) {
            RunOutcome::Finished(result) => result,
            RunOutcome::Suspended { .. } => panic!("batch runs never suspend"),
        }
    }

    #[test]
    fn test_preflight_sees_created_files() {
        let mut workspace = Workspace::new();
        let file = FileRef::new("new.txt");
        let command = Command::create_file(FileRef::new(""), "new.txt", FileContent::Text("a".into()))
            .and_then(Command::replace_text(file.clone(), "a", "ab"));
        assert_eq!(run_batch(&mut workspace, command), BatchExecutionResult::Success);
        assert_eq!(workspace.text(&file).as_deref(), Some("ab"));
    }

    #[test]
    fn test_preflight_follows_moves() {
        let mut workspace = Workspace::new().with_text("a.txt", "x");
        let command = Command::move_file(FileRef::new("a.txt"), FileRef::new("b.txt"))
            .and_then(Command::replace_text(FileRef::new("a.txt"), "x", "y"));
        let result = run_batch(&mut workspace, command);
        assert_eq!(result, BatchExecutionResult::Error("file `a.txt` not found".into()));
        assert_eq!(workspace.text(&FileRef::new("a.txt")).as_deref(), Some("x"));
    }

    #[test]
    fn test_fill_template_writes_values_in_order() {
        let workspace = Workspace::new().with_text("t.rs", "for i in 0..n { use(i); }");
        let template = StartTemplate::new(
            FileRef::new("t.rs"),
            vec![
                TemplateField::Expression {
                    range: TextRange::new(4, 5),
                    name: "var".into(),
                    default: "i".into(),
                },
                TemplateField::Dependent {
                    range: TextRange::new(20, 21),
                    name: "use".into(),
                    source: "var".into(),
                },
            ],
            Continuation::constant(Command::nop()),
        )
        .unwrap();
        let mut values = TemplateValues::new();
        values.insert("var".into(), "idx".into());
        let values = template.resolve_values(values);

        let command = fill_template(&workspace, &template, &values).unwrap();
        let Command::UpdateText(update) = command else {
            panic!("expected a text update");
        };
        assert_eq!(update.new_text(), "for idx in 0..n { use(idx); }");
    }

    #[traced_test]
    #[test]
    fn test_abort_is_logged() {
        let mut workspace = Workspace::new().with_text("a.txt", "live");
        let command = Command::replace_text(FileRef::new("a.txt"), "stale", "new");
        assert_eq!(run_batch(&mut workspace, command), BatchExecutionResult::Abort);
        assert!(logs_contain("text precondition mismatch"));
    }
}
