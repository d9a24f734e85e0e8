//! Interfaces the executors consume.
//!
//! A host owns the live state: document contents, open editor sessions, global options and the
//! message area. Executors only reach that state through these traits, so the same command can
//! run against an editor, a headless batch runner, or the in-memory [`crate::Workspace`].

use edit_command::{
    FileContent, FileRef, HighlightStyle, MessageKind, PatchError, Snapshot, TextPatch, TextRange,
};
use serde_json::Value;
use thiserror::Error;

/// Failures reported by a host while mutating live state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The file does not exist.
    #[error("file `{0}` not found")]
    NotFound(FileRef),
    /// The file already exists.
    #[error("file `{0}` already exists")]
    AlreadyExists(FileRef),
    /// The file exists but does not hold text.
    #[error("file `{0}` is not a text file")]
    NotText(FileRef),
    /// A move whose destination lies at or below its source.
    #[error("cannot move `{file}` into itself (`{destination}`)")]
    MoveIntoSelf {
        /// The moved file or directory.
        file: FileRef,
        /// The requested destination.
        destination: FileRef,
    },
    /// A file was expected to be a directory.
    #[error("`{0}` is not a directory")]
    NotADirectory(FileRef),
    /// The patch could not be applied to the live text.
    #[error("cannot patch `{file}`: {source}")]
    Patch {
        /// The patched file.
        file: FileRef,
        /// The underlying patch failure.
        source: PatchError,
    },
}

/// Read access to live document contents.
pub trait SnapshotProvider {
    /// Current text of `file`, or `None` if it does not exist or is not a text file.
    fn content(&self, file: &FileRef) -> Option<String>;

    /// Length of `file` in characters.
    fn char_len(&self, file: &FileRef) -> Option<usize> {
        self.content(file).map(|text| text.chars().count())
    }

    /// Returns `true` if anything (text, binary or directory) exists at `file`.
    fn exists(&self, file: &FileRef) -> bool;

    /// An immutable copy of every text file, for background computations.
    fn snapshot(&self) -> Snapshot;
}

/// Write access to live documents.
pub trait DocumentWriter {
    /// Apply a validated patch to `file`. The live text must equal the patch's old text.
    fn apply_patch(&mut self, file: &FileRef, patch: &TextPatch) -> Result<(), HostError>;

    /// Create a file, binary file or directory at `path`.
    fn create_file(&mut self, path: &FileRef, content: &FileContent) -> Result<(), HostError>;

    /// Delete `file` (and, for a directory, everything below it).
    fn delete_file(&mut self, file: &FileRef) -> Result<(), HostError>;

    /// Move `file` to `destination`.
    fn move_file(&mut self, file: &FileRef, destination: &FileRef) -> Result<(), HostError>;
}

/// A live editor attached to one file.
pub trait EditorSession {
    /// Caret offset.
    fn caret(&self) -> usize;
    /// Move the caret.
    fn set_caret(&mut self, offset: usize);
    /// Current selection, if any.
    fn selection(&self) -> Option<TextRange>;
    /// Replace the selection.
    fn set_selection(&mut self, selection: Option<TextRange>);
    /// Highlighted ranges.
    fn highlights(&self) -> &[(TextRange, HighlightStyle)];
    /// Replace the highlighted ranges.
    fn set_highlights(&mut self, highlights: Vec<(TextRange, HighlightStyle)>);
}

/// Maps a file to zero or one live editor session.
pub trait SessionRegistry {
    /// The session showing `file`, if one is open.
    fn session_mut(&mut self, file: &FileRef) -> Option<&mut dyn EditorSession>;
}

/// Global options, as JSON values.
pub trait OptionStore {
    /// Current value of option `id`.
    fn option(&self, id: &str) -> Option<Value>;
    /// Set option `id`.
    fn set_option(&mut self, id: &str, value: Value);
}

/// Where user-facing messages go.
pub trait MessageSink {
    /// Show a message.
    fn show_message(&mut self, text: &str, kind: MessageKind);
}

/// Everything an executor needs from its environment.
pub trait Host: SnapshotProvider + DocumentWriter + SessionRegistry + OptionStore + MessageSink {}

impl<T> Host for T where
    T: SnapshotProvider + DocumentWriter + SessionRegistry + OptionStore + MessageSink + ?Sized
{
}

/// Move every offset the session holds through `patch`.
///
/// The caret and range ends lean right, range starts lean left, so text inserted at a range
/// boundary ends up inside it.
pub fn translate_session(session: &mut dyn EditorSession, patch: &TextPatch) {
    let translate = |range: TextRange| {
        TextRange::new(
            patch.translate_offset(range.start, false),
            patch.translate_offset(range.end, true),
        )
    };

    session.set_caret(patch.translate_offset(session.caret(), true));
    if let Some(selection) = session.selection() {
        session.set_selection(Some(translate(selection)));
    }
    if !session.highlights().is_empty() {
        let highlights = session
            .highlights()
            .iter()
            .map(|(range, style)| (translate(*range), *style))
            .collect();
        session.set_highlights(highlights);
    }
}
