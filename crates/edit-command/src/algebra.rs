//! Command algebra: sequencing, flattening, emptiness and local merging.
//!
//! Laws (for commands without continuations):
//! - `Command::nop().and_then(x) == x` and `x.and_then(Command::nop()) == x`
//! - `a.and_then(b).unpack() == [a.unpack(), b.unpack()].concat()`
//! - no element of `unpack()` is a [`Command::Composite`]
//!
//! When the left operand ends with a continuation-bearing command, the right operand is threaded
//! through the continuation instead of being appended, so it runs after the interaction resolves.

use crate::FileRef;
use crate::command::{ChoiceAction, Command, Composite};
use std::collections::BTreeSet;

impl Command {
    /// Run `self`, then `next`.
    pub fn and_then(self, next: Command) -> Command {
        if self.is_empty() {
            return next;
        }
        if next.is_empty() {
            return self;
        }

        let mut leaves = self.into_leaves();
        match leaves.pop() {
            Some(last) if last.has_continuation() => {
                leaves.push(last.thread_tail(next));
            }
            Some(last) => {
                leaves.push(last);
                leaves.extend(next.into_leaves());
            }
            None => return next,
        }
        Self::from_leaves(leaves)
    }

    /// Sequence many commands, left to right.
    pub fn compose<I>(commands: I) -> Command
    where
        I: IntoIterator<Item = Command>,
    {
        commands
            .into_iter()
            .fold(Command::Nop, |acc, command| acc.and_then(command))
    }

    /// The non-empty leaves of this command, in execution order.
    pub fn unpack(&self) -> Vec<Command> {
        match self {
            Self::Composite(composite) => composite.0.clone(),
            leaf if leaf.is_empty() => Vec::new(),
            leaf => vec![leaf.clone()],
        }
    }

    /// Like [`Command::unpack`], consuming the command.
    pub fn into_leaves(self) -> Vec<Command> {
        match self {
            Self::Composite(composite) => composite.0,
            leaf if leaf.is_empty() => Vec::new(),
            leaf => vec![leaf],
        }
    }

    /// Build a command from leaves: empty leaves are dropped, nested composites are flattened,
    /// and a composite is only created for two or more leaves.
    pub fn from_leaves(leaves: Vec<Command>) -> Command {
        let mut flat: Vec<Command> = leaves
            .into_iter()
            .flat_map(Command::into_leaves)
            .collect();
        match flat.len() {
            0 => Command::Nop,
            1 => flat.pop().unwrap_or(Command::Nop),
            _ => Command::Composite(Composite(flat)),
        }
    }

    /// Returns `true` if executing this command has no effect.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Nop => true,
            Self::UpdateText(update) => update.patch().is_empty(),
            Self::Highlight(highlight) => highlight.ranges.is_empty(),
            Self::UpdateOptions(updates) => updates.is_empty(),
            Self::ChooseOne(choose) => choose.actions.is_empty(),
            Self::Composite(composite) => composite.0.iter().all(Command::is_empty),
            _ => false,
        }
    }

    /// Returns `true` for variants whose next step depends on a user selection.
    pub fn has_continuation(&self) -> bool {
        matches!(
            self,
            Self::ChooseOne(_) | Self::ChooseMany(_) | Self::EditOptions(_) | Self::StartTemplate(_)
        )
    }

    fn thread_tail(self, next: Command) -> Command {
        match self {
            Self::ChooseOne(mut choose) => {
                choose.actions = choose
                    .actions
                    .into_iter()
                    .map(|action| ChoiceAction {
                        continuation: action.continuation.then(next.clone()),
                        name: action.name,
                    })
                    .collect();
                Self::ChooseOne(choose)
            }
            Self::ChooseMany(choose) => {
                let continuation = choose.continuation().then(next);
                Self::ChooseMany(choose.with_continuation(continuation))
            }
            Self::EditOptions(mut options) => {
                options.continuation = options.continuation.then(next);
                Self::EditOptions(options)
            }
            Self::StartTemplate(template) => {
                let continuation = template.continuation().then(next);
                Self::StartTemplate(template.with_continuation(continuation))
            }
            other => Self::from_leaves(vec![other, next]),
        }
    }

    /// Try to merge `self` with `next` into one leaf.
    ///
    /// Only text updates of the same file where `next` was computed against `self`'s result are
    /// merged. The merge trusts that nothing else touches the file in between.
    pub fn try_merge(&self, next: &Command) -> Option<Command> {
        match (self, next) {
            (Self::UpdateText(first), Self::UpdateText(second)) => {
                first.merge_with_next(second).map(Command::UpdateText)
            }
            _ => None,
        }
    }

    /// Merge every pair of adjacent leaves that [`Command::try_merge`] accepts.
    pub fn merge_adjacent(self) -> Command {
        let mut merged: Vec<Command> = Vec::new();
        for leaf in self.into_leaves() {
            let combined = merged.last().and_then(|last| last.try_merge(&leaf));
            match combined {
                Some(combined) => {
                    merged.pop();
                    merged.push(combined);
                }
                None => merged.push(leaf),
            }
        }
        Self::from_leaves(merged)
    }

    /// Files this command creates, modifies, moves or deletes. Continuations are not evaluated.
    pub fn modified_files(&self) -> BTreeSet<FileRef> {
        let mut files = BTreeSet::new();
        for leaf in self.unpack() {
            match leaf {
                Self::UpdateText(update) => {
                    files.insert(update.target().clone());
                }
                Self::CreateFile(create) => {
                    files.insert(create.path());
                }
                Self::DeleteFile(delete) => {
                    files.insert(delete.target);
                }
                Self::MoveFile(moved) => {
                    files.insert(moved.target);
                    files.insert(moved.destination);
                }
                Self::StartTemplate(template) => {
                    files.insert(template.target().clone());
                }
                Self::RenameRequest(rename) => {
                    files.insert(rename.target);
                }
                Self::UpdateReferences(references) => {
                    files.insert(references.target);
                }
                _ => {}
            }
        }
        files
    }
}
