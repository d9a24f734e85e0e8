#![warn(missing_docs)]
//! Edit Command Exec - Applying Edit Commands to a Live Workspace
//!
//! # Overview
//!
//! `edit-command-exec` runs [`edit_command::Command`] values against a host. The host is
//! anything that implements the traits in [`host`]; [`Workspace`] is a complete in-memory
//! implementation used by tests and headless tools.
//!
//! # Core Features
//!
//! - **Interactive Execution**: steps that need a user suspend and resume later
//! - **Batch Execution**: unattended runs with default choices and a tagged result
//! - **Precondition Checks**: stale commands abort before anything is mutated
//! - **Session Translation**: carets, selections and highlights follow applied edits
//! - **Background Computations**: commands computed on worker threads, cancellable
//! - **Previews**: apply to an isolated copy, or describe a command as a diff
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  InteractiveExecutor / BatchExecutor        │  ← Entry points (owner thread)
//! ├─────────────────────────────────────────────┤
//! │  Run loop (pre-flight, leaf steps)          │  ← Shared semantics
//! ├─────────────────────────────────────────────┤
//! │  Host traits (Workspace in memory)          │  ← Live state
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use edit_command::{Command, FileRef};
//! use edit_command_exec::{BatchExecutionResult, BatchExecutor, OwnerToken, Workspace};
//!
//! let owner = OwnerToken::new();
//! let file = FileRef::new("main.rs");
//! let mut workspace = Workspace::new().with_text("main.rs", "let a = 1;");
//!
//! let command = Command::replace_text(file.clone(), "let a = 1;", "let b = 1;");
//! let result = BatchExecutor::default().execute(&owner, &mut workspace, command);
//!
//! assert_eq!(result, BatchExecutionResult::Success);
//! assert_eq!(workspace.text(&file).as_deref(), Some("let b = 1;"));
//! ```
//!
//! # Module Description
//!
//! - [`host`] - Interfaces to live state
//! - [`workspace`] - In-memory host
//! - [`interactive`] - Suspend/resume execution
//! - [`batch`] - Unattended execution
//! - [`result`] - Execution outcome
//! - [`config`] - Executor configuration
//! - [`background`] - Worker-thread computations
//! - [`owner`] - Owner-thread capability
//! - [`references`] - Call-site propagation
//! - [`preview`] - Isolated copies and previews

pub mod background;
pub mod batch;
pub mod config;
mod executor;
pub mod host;
pub mod interactive;
pub mod owner;
pub mod preview;
pub mod references;
pub mod result;
pub mod workspace;

pub use background::{
    CancellationToken, Cancelled, ComputationHandle, ComputationState, spawn_computation,
};
pub use batch::BatchExecutor;
pub use config::ExecutorConfig;
pub use host::{
    DocumentWriter, EditorSession, Host, HostError, MessageSink, OptionStore, SessionRegistry,
    SnapshotProvider, translate_session,
};
pub use interactive::{
    Execution, ExecutorError, Interaction, InteractionSurface, InteractiveExecutor, Response,
    Suspension, drive,
};
pub use owner::OwnerToken;
pub use preview::{Preview, PreviewError, apply_to_copy, preview};
pub use result::BatchExecutionResult;
pub use workspace::{
    Session, SessionId, Workspace, WorkspaceChange, WorkspaceChangeCallback, WorkspaceChangeKind,
    WorkspaceError,
};
