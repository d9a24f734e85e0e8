//! Update recording.
//!
//! Analysis code runs against a read-only [`Snapshot`]. To describe a change it asks an
//! [`UpdateRecorder`] for a writable [`ShadowDocument`] of a file, edits the shadow freely, and
//! finally calls [`UpdateRecorder::finish`], which diffs every shadow against its original and
//! synthesizes the resulting [`Command`].
//!
//! Shadows live in an arena keyed by file identity; the live documents are never reachable from
//! a recorder. Caret, selection, highlight and rename ranges recorded on a shadow are markers:
//! later edits of the same shadow move them.
//!
//! ```rust
//! use edit_command::{Command, FileRef, Snapshot, TextRange, record};
//!
//! let file = FileRef::new("main.rs");
//! let snapshot = Snapshot::from_files([(file.clone(), "let x = 1;")]);
//!
//! let command = record(&snapshot, |recorder| {
//!     let doc = recorder.writable(&file)?;
//!     doc.replace(TextRange::new(4, 5), "count")?;
//!     recorder.select(&file, TextRange::new(4, 9))?;
//!     Ok(())
//! });
//!
//! let leaves = command.unpack();
//! assert_eq!(leaves.len(), 2);
//! let Command::UpdateText(update) = &leaves[0] else { unreachable!() };
//! assert_eq!(update.new_text(), "let count = 1;");
//! ```

use crate::command::{
    CreateFile, FileContent, FileRef, HighlightStyle, Navigate, OptionUpdate, RenameRequest,
    UpdateText,
};
use crate::patch::{Fragment, TextPatch, compose, tighten};
use crate::search::{SearchError, SearchOptions, find_all};
use crate::snapshot::Snapshot;
use crate::text::{TextRange, char_len};
use crate::{Command, Highlight};
use ropey::Rope;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while recording.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The file is not part of the snapshot.
    #[error("file `{0}` is not part of the snapshot")]
    UnknownFile(FileRef),
    /// A range or offset lies outside the document.
    #[error("range {start}..{end} is outside the document (length {len})")]
    OutOfBounds {
        /// Start of the requested range.
        start: usize,
        /// End of the requested range.
        end: usize,
        /// Document length in characters.
        len: usize,
    },
    /// A search inside a shadow failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A writable copy of one snapshot file.
#[derive(Debug, Clone)]
pub struct ShadowDocument {
    original: String,
    rope: Rope,
    fragments: Vec<Fragment>,
    caret: Option<usize>,
    selection: Option<TextRange>,
    highlights: Vec<(TextRange, HighlightStyle)>,
    rename: Option<TextRange>,
}

impl ShadowDocument {
    fn new(original: &str) -> Self {
        Self {
            original: original.to_string(),
            rope: Rope::from_str(original),
            fragments: Vec::new(),
            caret: None,
            selection: None,
            highlights: Vec::new(),
            rename: None,
        }
    }

    /// Current text of the shadow.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of the file as it is in the snapshot.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Current length in characters.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the shadow is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text inside `range`.
    pub fn slice(&self, range: TextRange) -> Result<String, RecordError> {
        self.check(range)?;
        Ok(self.rope.slice(range.start..range.end).to_string())
    }

    /// Find occurrences of `query` in the current text.
    pub fn find(&self, query: &str, options: SearchOptions) -> Result<Vec<TextRange>, RecordError> {
        Ok(find_all(&self.text(), query, options)?)
    }

    /// Replace `range` with `text`.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<(), RecordError> {
        self.check(range)?;
        let edit = Fragment::new(range.start, range.len(), char_len(text));
        if edit.old_length == 0 && edit.new_length == 0 {
            return Ok(());
        }

        self.rope.remove(range.start..range.end);
        self.rope.insert(range.start, text);
        self.fragments = compose(&self.fragments, &[edit]);

        self.caret = self.caret.map(|caret| edit.translate_offset(caret, true));
        self.selection = self.selection.map(|range| translate_range(&edit, range));
        self.rename = self.rename.map(|range| translate_range(&edit, range));
        for (range, _) in &mut self.highlights {
            *range = translate_range(&edit, *range);
        }
        Ok(())
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), RecordError> {
        self.replace(TextRange::empty(offset), text)
    }

    /// Delete `range`.
    pub fn delete(&mut self, range: TextRange) -> Result<(), RecordError> {
        self.replace(range, "")
    }

    fn check(&self, range: TextRange) -> Result<(), RecordError> {
        let len = self.len();
        if range.end > len {
            return Err(RecordError::OutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    fn into_update(self, target: FileRef) -> Option<UpdateText> {
        let text = self.rope.to_string();
        if text == self.original {
            return None;
        }
        let fragments = tighten(&self.original, &text, self.fragments);
        let update = UpdateText::new(target.clone(), self.original.clone(), text.clone(), fragments)
            .unwrap_or_else(|err| {
                tracing::warn!(%target, %err, "recorded fragments rejected, falling back to a single fragment");
                UpdateText::from_patch(target, TextPatch::between(self.original, text))
            });
        Some(update)
    }
}

fn translate_range(edit: &Fragment, range: TextRange) -> TextRange {
    TextRange::new(
        edit.translate_offset(range.start, false),
        edit.translate_offset(range.end, true),
    )
}

/// Records the changes a background computation wants to make.
#[derive(Debug)]
pub struct UpdateRecorder<'s> {
    snapshot: &'s Snapshot,
    shadows: BTreeMap<FileRef, ShadowDocument>,
    navigation: Option<FileRef>,
    rename: Option<(FileRef, Vec<String>)>,
    created: Vec<CreateFile>,
    deleted: Vec<FileRef>,
    moved: Vec<(FileRef, FileRef)>,
    messages: Vec<Command>,
    options: Vec<OptionUpdate>,
    cancelled: Option<String>,
}

impl<'s> UpdateRecorder<'s> {
    /// Start recording against `snapshot`.
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self {
            snapshot,
            shadows: BTreeMap::new(),
            navigation: None,
            rename: None,
            created: Vec::new(),
            deleted: Vec::new(),
            moved: Vec::new(),
            messages: Vec::new(),
            options: Vec::new(),
            cancelled: None,
        }
    }

    /// The snapshot being recorded against.
    pub fn snapshot(&self) -> &Snapshot {
        self.snapshot
    }

    /// The writable shadow of `file`, created on first access.
    pub fn writable(&mut self, file: &FileRef) -> Result<&mut ShadowDocument, RecordError> {
        if !self.shadows.contains_key(file) {
            let text = self
                .snapshot
                .text(file)
                .ok_or_else(|| RecordError::UnknownFile(file.clone()))?;
            self.shadows.insert(file.clone(), ShadowDocument::new(text));
        }
        self.shadows
            .get_mut(file)
            .ok_or_else(|| RecordError::UnknownFile(file.clone()))
    }

    /// Put the caret at `offset` in `file`. Replaces any earlier navigation.
    pub fn move_caret(&mut self, file: &FileRef, offset: usize) -> Result<(), RecordError> {
        let shadow = self.navigation_target(file)?;
        shadow.check(TextRange::empty(offset))?;
        shadow.caret = Some(offset);
        Ok(())
    }

    /// Select `range` in `file`, caret at its end. Replaces any earlier navigation.
    pub fn select(&mut self, file: &FileRef, range: TextRange) -> Result<(), RecordError> {
        let shadow = self.navigation_target(file)?;
        shadow.check(range)?;
        shadow.selection = Some(range);
        shadow.caret = Some(range.end);
        Ok(())
    }

    /// Highlight `range` in `file`.
    pub fn highlight(
        &mut self,
        file: &FileRef,
        range: TextRange,
        style: HighlightStyle,
    ) -> Result<(), RecordError> {
        let shadow = self.writable(file)?;
        shadow.check(range)?;
        shadow.highlights.push((range, style));
        Ok(())
    }

    /// Request an in-place rename of the name at `range`. Replaces any earlier request.
    pub fn rename(
        &mut self,
        file: &FileRef,
        range: TextRange,
        suggestions: Vec<String>,
    ) -> Result<(), RecordError> {
        if let Some((previous, _)) = self.rename.take() {
            if let Some(shadow) = self.shadows.get_mut(&previous) {
                shadow.rename = None;
            }
        }
        let shadow = self.writable(file)?;
        shadow.check(range)?;
        shadow.rename = Some(range);
        self.rename = Some((file.clone(), suggestions));
        Ok(())
    }

    /// Create a file.
    pub fn create_file(&mut self, parent: FileRef, name: impl Into<String>, content: FileContent) {
        self.created.push(CreateFile {
            parent,
            name: name.into(),
            kind_hint: None,
            content,
        });
    }

    /// Delete a file.
    pub fn delete_file(&mut self, file: FileRef) {
        self.deleted.push(file);
    }

    /// Move a file.
    pub fn move_file(&mut self, file: FileRef, destination: FileRef) {
        self.moved.push((file, destination));
    }

    /// Show an informational message after the change.
    pub fn message(&mut self, text: impl Into<String>) {
        self.messages.push(Command::info(text));
    }

    /// Change a global option.
    pub fn update_option(&mut self, id: impl Into<String>, old_value: Value, new_value: Value) {
        self.options.push(OptionUpdate {
            id: id.into(),
            old_value,
            new_value,
        });
    }

    /// Abandon the recording. Everything recorded so far, and anything recorded later, is
    /// discarded; [`UpdateRecorder::finish`] returns a single error message. The last call
    /// decides the message.
    pub fn cancel(&mut self, message: impl Into<String>) {
        self.cancelled = Some(message.into());
    }

    /// Returns `true` once [`UpdateRecorder::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }

    /// Synthesize the recorded command.
    pub fn finish(self) -> Command {
        if let Some(message) = self.cancelled {
            tracing::debug!(%message, "recording cancelled");
            return Command::error(message);
        }

        let mut commands: Vec<Command> = self.created.into_iter().map(Command::from).collect();
        let mut navigate = None;
        let mut highlights = Vec::new();
        let mut rename = None;

        for (file, shadow) in self.shadows {
            if self.navigation.as_ref() == Some(&file)
                && (shadow.caret.is_some() || shadow.selection.is_some())
            {
                navigate = Some(Navigate {
                    target: file.clone(),
                    selection_start: shadow.selection.map(|range| range.start),
                    selection_end: shadow.selection.map(|range| range.end),
                    caret: shadow.caret,
                });
            }
            if !shadow.highlights.is_empty() {
                highlights.push(Command::Highlight(Highlight {
                    target: file.clone(),
                    ranges: shadow.highlights.clone(),
                }));
            }
            if let (Some(range), Some((_, suggestions))) = (shadow.rename, self.rename.as_ref()) {
                rename = Some(RenameRequest {
                    target: file.clone(),
                    range,
                    suggestions: suggestions.clone(),
                });
            }
            if let Some(update) = shadow.into_update(file) {
                commands.push(Command::UpdateText(update));
            }
        }

        commands.extend(self.deleted.into_iter().map(Command::delete_file));
        commands.extend(
            self.moved
                .into_iter()
                .map(|(file, destination)| Command::move_file(file, destination)),
        );
        commands.extend(navigate.map(Command::Navigate));
        commands.extend(highlights);
        commands.extend(rename.map(Command::RenameRequest));
        commands.extend(self.messages);
        if !self.options.is_empty() {
            commands.push(Command::update_options(self.options));
        }
        Command::from_leaves(commands)
    }

    fn navigation_target(&mut self, file: &FileRef) -> Result<&mut ShadowDocument, RecordError> {
        if let Some(previous) = self.navigation.replace(file.clone()) {
            if &previous != file {
                if let Some(shadow) = self.shadows.get_mut(&previous) {
                    shadow.caret = None;
                    shadow.selection = None;
                }
            }
        }
        self.writable(file)
    }
}

/// Run `f` against a fresh recorder and return the synthesized command.
///
/// An error returned by `f` cancels the recording with the error's message.
pub fn record<F>(snapshot: &Snapshot, f: F) -> Command
where
    F: FnOnce(&mut UpdateRecorder<'_>) -> Result<(), RecordError>,
{
    let mut recorder = UpdateRecorder::new(snapshot);
    if let Err(err) = f(&mut recorder) {
        recorder.cancel(err.to_string());
    }
    recorder.finish()
}
