#![warn(missing_docs)]
//! Edit Command - Immutable, Composable Descriptions of Editor Effects
//!
//! # Overview
//!
//! `edit-command` models every effect an automated code transformation can have on a workspace
//! as a value: text updates, file operations, navigation, highlighting, messages, user
//! interactions and option changes. Values are built against a private snapshot (often on a
//! background thread), combined with a small algebra, inspected or previewed, and finally handed
//! to an executor that applies them to the live workspace.
//!
//! # Core Features
//!
//! - **Text Patches**: full old/new text plus sorted, non-touching fragments in new-text coordinates
//! - **Patch Composition**: two sequential patches of one file fuse into one
//! - **Command Algebra**: `and_then` with identity, flattening and continuation threading
//! - **Update Recording**: edit writable shadows of a snapshot, then synthesize the command
//! - **JSON Projection**: every inspectable field, for tooling and logging
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Recorder (shadows over a Snapshot)         │  ← Producing commands
//! ├─────────────────────────────────────────────┤
//! │  Algebra (and_then, unpack, merge)          │  ← Combining commands
//! ├─────────────────────────────────────────────┤
//! │  Command variants + Continuations           │  ← Describing effects
//! ├─────────────────────────────────────────────┤
//! │  TextPatch / Fragment (ropey)               │  ← Describing text changes
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use edit_command::{Command, FileRef, MessageKind};
//!
//! let file = FileRef::new("src/main.rs");
//! let command = Command::replace_text(file.clone(), "let a = 1;", "let b = 1;")
//!     .and_then(Command::caret(file.clone(), 5))
//!     .and_then(Command::nop())
//!     .and_then(Command::info("renamed"));
//!
//! let leaves = command.unpack();
//! assert_eq!(leaves.len(), 3);
//! assert!(matches!(&leaves[2], Command::Message(m) if m.kind == MessageKind::Info));
//! assert_eq!(command.to_json()["kind"], "composite");
//! ```
//!
//! # Module Description
//!
//! - [`text`] - Character ranges and offset helpers
//! - [`patch`] - Fragments, text patches and patch composition
//! - [`command`] - Command variants
//! - [`continuation`] - Selection-to-command functions of interactive commands
//! - [`algebra`] - Sequencing, flattening and merging
//! - [`snapshot`] - Immutable file contents for background work
//! - [`search`] - Literal/regex search over character offsets
//! - [`recorder`] - Writable shadows and command synthesis
//! - [`json`] - JSON export of commands
//!
//! All offsets in this crate are **character offsets** (Unicode scalar values).

pub mod algebra;
pub mod command;
pub mod continuation;
pub mod json;
pub mod patch;
pub mod recorder;
pub mod search;
pub mod snapshot;
pub mod text;

pub use command::{
    ChoiceAction, ChooseMany, ChooseOne, Command, CommandError, Composite, CreateFile, DeleteFile,
    EditOptions, ElementRef, FileContent, FileRef, Highlight, HighlightStyle, Message,
    MessageKind, MoveFile, Navigate, OptionUpdate, OptionsFactory, RenameRequest, SelectionMode,
    ShowConflicts, StartTemplate, TemplateField, TemplateValues, UpdateReferences, UpdateText,
};
pub use continuation::Continuation;
pub use patch::{Fragment, PatchError, TextPatch, compose};
pub use recorder::{RecordError, ShadowDocument, UpdateRecorder, record};
pub use search::{SearchError, SearchOptions, find_all, is_word_char};
pub use snapshot::Snapshot;
pub use text::{TextRange, char_slice};
