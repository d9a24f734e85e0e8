//! Interactive execution.
//!
//! Steps that need a user suspend the run and hand back a [`Suspension`] describing what to
//! ask. The caller shows the question however it likes and passes the answer to
//! [`InteractiveExecutor::resume`], which picks up exactly where the run stopped. Nothing
//! blocks, so an editor can keep processing input while a dialog is open.

use crate::background::ComputationHandle;
use crate::config::ExecutorConfig;
use crate::executor::{Policy, Run, RunOutcome, fill_rename, fill_template};
use crate::host::Host;
use crate::owner::OwnerToken;
use crate::result::BatchExecutionResult;
use edit_command::{
    Command, ElementRef, FileRef, SelectionMode, TemplateField, TemplateValues, TextRange,
};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// A question for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Pick one of `actions`; answer with [`Response::Choice`].
    ChooseOne {
        /// List title.
        title: String,
        /// Action names in presentation order.
        actions: Vec<String>,
    },
    /// Pick a subset of `candidates`; answer with [`Response::Selection`].
    ChooseMany {
        /// List title.
        title: String,
        /// Candidates in presentation order.
        candidates: Vec<String>,
        /// Preselected candidates.
        default_selection: Vec<String>,
        /// Allowed selection size.
        mode: SelectionMode,
    },
    /// Edit an options object; answer with [`Response::Options`].
    EditOptions {
        /// Dialog title.
        title: String,
        /// Default options.
        defaults: Value,
    },
    /// Confirm or decline despite conflicts; answer with [`Response::Confirm`].
    ShowConflicts {
        /// Conflict descriptions per element.
        conflicts: BTreeMap<ElementRef, Vec<String>>,
    },
    /// Fill template fields; answer with [`Response::Template`].
    Template {
        /// File the template runs in.
        target: FileRef,
        /// Fields sorted by range.
        fields: Vec<TemplateField>,
    },
    /// Rename in place; answer with [`Response::Rename`].
    Rename {
        /// File containing the element.
        target: FileRef,
        /// Range of the current name.
        range: TextRange,
        /// Suggested names, best first.
        suggestions: Vec<String>,
    },
}

impl Interaction {
    /// Short name, for logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ChooseOne { .. } => "chooseOne",
            Self::ChooseMany { .. } => "chooseMany",
            Self::EditOptions { .. } => "editOptions",
            Self::ShowConflicts { .. } => "showConflicts",
            Self::Template { .. } => "template",
            Self::Rename { .. } => "rename",
        }
    }
}

/// The user's answer to an [`Interaction`].
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Index of the chosen action.
    Choice(usize),
    /// Chosen candidates.
    Selection(Vec<String>),
    /// Edited options.
    Options(Value),
    /// Continue (`true`) or decline (`false`).
    Confirm(bool),
    /// Field values; missing expression fields take their defaults.
    Template(TemplateValues),
    /// The new name.
    Rename(String),
    /// Abandon the rest of the command.
    Cancel,
}

/// Errors from [`InteractiveExecutor::resume`]. The suspension is consumed either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The response does not answer the pending interaction.
    #[error("response does not answer a `{expected}` interaction")]
    UnexpectedResponse {
        /// Kind of the pending interaction.
        expected: &'static str,
    },
    /// A choice index past the end of the action list.
    #[error("choice {index} is out of range for {len} actions")]
    ChoiceOutOfRange {
        /// Chosen index.
        index: usize,
        /// Number of actions.
        len: usize,
    },
    /// A selection whose size the selection mode does not allow.
    #[error("a selection of {count} is not allowed in mode {mode:?}")]
    InvalidSelection {
        /// Selection size.
        count: usize,
        /// Selection mode.
        mode: SelectionMode,
    },
    /// A selected name that is not a candidate.
    #[error("`{0}` is not a candidate")]
    UnknownCandidate(String),
}

/// A run waiting for the user.
#[derive(Debug)]
pub struct Suspension {
    interaction: Interaction,
    leaf: Command,
    rest: Vec<Command>,
}

impl Suspension {
    /// What to ask.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }
}

/// State of an interactive run.
#[derive(Debug)]
pub enum Execution {
    /// The run ended.
    Finished(BatchExecutionResult),
    /// The run waits for [`InteractiveExecutor::resume`].
    Suspended(Suspension),
    /// The user cancelled, or the computation producing the command was cancelled.
    Cancelled,
}

impl Execution {
    fn from_outcome(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Finished(result) => Self::Finished(result),
            RunOutcome::Suspended {
                interaction,
                leaf,
                rest,
            } => Self::Suspended(Suspension {
                interaction,
                leaf,
                rest,
            }),
        }
    }
}

/// Runs commands against a live host, asking the user where needed.
#[derive(Debug, Clone, Default)]
pub struct InteractiveExecutor {
    config: ExecutorConfig,
}

impl InteractiveExecutor {
    /// Create an executor.
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// The executor's configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Start running `command`.
    pub fn execute<H>(&self, _owner: &OwnerToken, host: &mut H, command: Command) -> Execution
    where
        H: Host + ?Sized,
    {
        let _span = tracing::debug_span!("execute", mode = "interactive").entered();
        if command.is_empty() {
            return Execution::Finished(BatchExecutionResult::Nothing);
        }
        let mut run = Run::new(host, &self.config, Policy::Interactive);
        let queue = run.leaves(command);
        Execution::from_outcome(run.run(queue))
    }

    /// Continue a suspended run with the user's answer.
    pub fn resume<H>(
        &self,
        _owner: &OwnerToken,
        host: &mut H,
        suspension: Suspension,
        response: Response,
    ) -> Result<Execution, ExecutorError>
    where
        H: Host + ?Sized,
    {
        let _span = tracing::debug_span!(
            "resume",
            interaction = suspension.interaction.kind_name()
        )
        .entered();
        let Suspension {
            interaction,
            leaf,
            rest,
        } = suspension;
        let unexpected = || ExecutorError::UnexpectedResponse {
            expected: interaction.kind_name(),
        };

        if response == Response::Cancel {
            tracing::debug!("cancelled by the user");
            return Ok(Execution::Cancelled);
        }

        let next = match (&leaf, response) {
            (Command::ChooseOne(choose), Response::Choice(index)) => {
                let action = choose.actions.get(index).ok_or(ExecutorError::ChoiceOutOfRange {
                    index,
                    len: choose.actions.len(),
                })?;
                action.continuation.resolve(())
            }
            (Command::ChooseMany(choose), Response::Selection(selection)) => {
                if let Some(unknown) = selection
                    .iter()
                    .find(|name| !choose.candidates().contains(name))
                {
                    return Err(ExecutorError::UnknownCandidate(unknown.clone()));
                }
                if !choose.mode().accepts(selection.len()) {
                    return Err(ExecutorError::InvalidSelection {
                        count: selection.len(),
                        mode: choose.mode(),
                    });
                }
                choose.continuation().resolve(selection)
            }
            (Command::EditOptions(options), Response::Options(value)) => {
                options.continuation.resolve(value)
            }
            (Command::ShowConflicts(_), Response::Confirm(true)) => Command::nop(),
            (Command::ShowConflicts(_), Response::Confirm(false)) => {
                tracing::debug!("conflicts declined");
                return Ok(Execution::Cancelled);
            }
            (Command::StartTemplate(template), Response::Template(values)) => {
                let values = template.resolve_values(values);
                match fill_template(&*host, template, &values) {
                    Ok(fill) => fill.and_then(template.continuation().resolve(values)),
                    Err(result) => return Ok(Execution::Finished(result)),
                }
            }
            (Command::RenameRequest(rename), Response::Rename(name)) => {
                match fill_rename(&*host, rename, &name) {
                    Ok(fill) => fill,
                    Err(result) => return Ok(Execution::Finished(result)),
                }
            }
            _ => return Err(unexpected()),
        };

        let mut run = Run::new(host, &self.config, Policy::Interactive);
        let queue = run.leaves(next.and_then(Command::from_leaves(rest)));
        Ok(Execution::from_outcome(run.run(queue)))
    }

    /// Wait for a background computation and run its command.
    pub fn execute_computation<H>(
        &self,
        owner: &OwnerToken,
        host: &mut H,
        handle: ComputationHandle,
    ) -> Execution
    where
        H: Host + ?Sized,
    {
        match handle.wait(owner) {
            Some(command) => self.execute(owner, host, command),
            None => Execution::Cancelled,
        }
    }
}

/// Something that can answer interactions synchronously, such as a scripted test double or a
/// modal dialog layer.
pub trait InteractionSurface {
    /// Answer `interaction`.
    fn respond(&mut self, interaction: &Interaction) -> Response;
}

/// Run `command` to completion, answering every interaction through `surface`.
///
/// Returns `None` if the user cancelled.
pub fn drive<H, S>(
    executor: &InteractiveExecutor,
    owner: &OwnerToken,
    host: &mut H,
    surface: &mut S,
    command: Command,
) -> Result<Option<BatchExecutionResult>, ExecutorError>
where
    H: Host + ?Sized,
    S: InteractionSurface + ?Sized,
{
    let mut execution = executor.execute(owner, host, command);
    loop {
        execution = match execution {
            Execution::Finished(result) => return Ok(Some(result)),
            Execution::Cancelled => return Ok(None),
            Execution::Suspended(suspension) => {
                let response = surface.respond(suspension.interaction());
                executor.resume(owner, host, suspension, response)?
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Workspace;
    use edit_command::ChoiceAction;

    #[test]
    fn test_wrong_response_kind_is_rejected() {
        let owner = OwnerToken::new();
        let mut workspace = Workspace::new();
        let executor = InteractiveExecutor::default();
        let command = Command::choose_one("pick", vec![ChoiceAction::new("a", Command::nop())]);

        let Execution::Suspended(suspension) = executor.execute(&owner, &mut workspace, command)
        else {
            panic!("expected a suspension");
        };
        let err = executor
            .resume(&owner, &mut workspace, suspension, Response::Confirm(true))
            .unwrap_err();
        assert_eq!(err, ExecutorError::UnexpectedResponse { expected: "chooseOne" });
    }

    #[test]
    fn test_choice_out_of_range() {
        let owner = OwnerToken::new();
        let mut workspace = Workspace::new();
        let executor = InteractiveExecutor::default();
        let command = Command::choose_one("pick", vec![ChoiceAction::new("a", Command::nop())]);

        let Execution::Suspended(suspension) = executor.execute(&owner, &mut workspace, command)
        else {
            panic!("expected a suspension");
        };
        let err = executor
            .resume(&owner, &mut workspace, suspension, Response::Choice(3))
            .unwrap_err();
        assert_eq!(err, ExecutorError::ChoiceOutOfRange { index: 3, len: 1 });
    }

    #[test]
    fn test_empty_command_is_nothing() {
        let owner = OwnerToken::new();
        let mut workspace = Workspace::new();
        let execution = InteractiveExecutor::default().execute(&owner, &mut workspace, Command::nop());
        assert!(matches!(execution, Execution::Finished(BatchExecutionResult::Nothing)));
    }
}
