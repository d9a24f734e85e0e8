//! Batch execution: run a command without a user.

use crate::background::ComputationHandle;
use crate::config::ExecutorConfig;
use crate::executor::{Policy, Run, RunOutcome};
use crate::host::Host;
use crate::owner::OwnerToken;
use crate::result::BatchExecutionResult;
use edit_command::Command;

/// Runs commands headless. Navigation and highlights are skipped, info messages are only
/// logged, and steps that need a user either take their configured defaults or end the run
/// with [`BatchExecutionResult::Interactive`].
#[derive(Debug, Clone, Default)]
pub struct BatchExecutor {
    config: ExecutorConfig,
}

impl BatchExecutor {
    /// Create an executor.
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// The executor's configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `command` to completion.
    pub fn execute<H>(&self, _owner: &OwnerToken, host: &mut H, command: Command) -> BatchExecutionResult
    where
        H: Host + ?Sized,
    {
        let _span = tracing::debug_span!("execute", mode = "batch").entered();
        if command.is_empty() {
            return BatchExecutionResult::Nothing;
        }
        let mut run = Run::new(host, &self.config, Policy::Batch);
        let queue = run.leaves(command);
        match run.run(queue) {
            RunOutcome::Finished(result) => result,
            RunOutcome::Suspended { interaction, .. } => {
                // Batch steps never ask; treat a stray question as needing a user.
                tracing::warn!(?interaction, "batch run asked for interaction");
                BatchExecutionResult::Interactive
            }
        }
    }

    /// Run several commands one after the other and combine their results.
    pub fn execute_all<H, I>(&self, owner: &OwnerToken, host: &mut H, commands: I) -> BatchExecutionResult
    where
        H: Host + ?Sized,
        I: IntoIterator<Item = Command>,
    {
        BatchExecutionResult::combine_all(
            commands
                .into_iter()
                .map(|command| self.execute(owner, host, command))
                .collect::<Vec<_>>(),
        )
    }

    /// Wait for a background computation and run its command. A cancelled computation yields
    /// [`BatchExecutionResult::Nothing`].
    pub fn execute_computation<H>(
        &self,
        owner: &OwnerToken,
        host: &mut H,
        handle: ComputationHandle,
    ) -> BatchExecutionResult
    where
        H: Host + ?Sized,
    {
        match handle.wait(owner) {
            Some(command) => self.execute(owner, host, command),
            None => BatchExecutionResult::Nothing,
        }
    }
}
