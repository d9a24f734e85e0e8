//! In-memory host.
//!
//! [`Workspace`] implements every host interface an executor consumes:
//!
//! - text files (stored as [`ropey::Rope`]), binary files and directories keyed by [`FileRef`]
//! - zero or one editor [`Session`] per file (caret, selection, highlights)
//! - global options as JSON values
//! - a message log
//!
//! Every mutation bumps the workspace version and is broadcast to subscribers as a
//! [`WorkspaceChange`].

use crate::host::{
    DocumentWriter, EditorSession, HostError, MessageSink, OptionStore, SessionRegistry,
    SnapshotProvider,
};
use edit_command::{
    FileContent, FileRef, HighlightStyle, MessageKind, Snapshot, TextPatch, TextRange,
};
use ropey::Rope;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Opaque identifier for an editor session in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What changed in a [`WorkspaceChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceChangeKind {
    /// A text file's content changed.
    TextChanged,
    /// A file or directory was created.
    FileCreated,
    /// A file or directory was deleted.
    FileDeleted,
    /// A file or directory was moved; `file` is the destination.
    FileMoved,
    /// A global option changed.
    OptionChanged,
    /// A message was shown.
    MessageShown,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceChange {
    /// Kind of change.
    pub kind: WorkspaceChangeKind,
    /// The affected file, if any.
    pub file: Option<FileRef>,
    /// Workspace version before the change.
    pub old_version: u64,
    /// Workspace version after the change.
    pub new_version: u64,
}

/// Callback invoked for every [`WorkspaceChange`].
pub type WorkspaceChangeCallback = Box<dyn FnMut(&WorkspaceChange) + Send>;

/// Workspace-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    /// No text file exists at this path.
    #[error("no text file at `{0}`")]
    FileNotFound(FileRef),
    /// Something already exists at this path.
    #[error("`{0}` already exists")]
    AlreadyExists(FileRef),
    /// The file already has a session.
    #[error("`{0}` already has an open session")]
    SessionAlreadyOpen(FileRef),
    /// A session id was not found.
    #[error("session {0:?} not found")]
    SessionNotFound(SessionId),
}

#[derive(Debug, Clone)]
enum Entry {
    Text(Rope),
    Binary(Vec<u8>),
    Directory,
}

/// Editor state for one open file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    caret: usize,
    selection: Option<TextRange>,
    highlights: Vec<(TextRange, HighlightStyle)>,
    version: u64,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            caret: 0,
            selection: None,
            highlights: Vec::new(),
            version: 0,
        }
    }

    /// The session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Incremented on every caret, selection or highlight change.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version = self.version.saturating_add(1);
    }
}

impl EditorSession for Session {
    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, offset: usize) {
        if self.caret != offset {
            self.caret = offset;
            self.bump();
        }
    }

    fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<TextRange>) {
        if self.selection != selection {
            self.selection = selection;
            self.bump();
        }
    }

    fn highlights(&self) -> &[(TextRange, HighlightStyle)] {
        &self.highlights
    }

    fn set_highlights(&mut self, highlights: Vec<(TextRange, HighlightStyle)>) {
        if self.highlights != highlights {
            self.highlights = highlights;
            self.bump();
        }
    }
}

/// An in-memory set of files, sessions, options and messages.
#[derive(Default)]
pub struct Workspace {
    entries: BTreeMap<FileRef, Entry>,
    next_session_id: u64,
    sessions: BTreeMap<FileRef, Session>,
    options: BTreeMap<String, Value>,
    messages: Vec<(MessageKind, String)>,
    version: u64,
    callbacks: Vec<WorkspaceChangeCallback>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("file_count", &self.entries.len())
            .field("session_count", &self.sessions.len())
            .field("option_count", &self.options.len())
            .field("message_count", &self.messages.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or overwrite) a text file.
    pub fn with_text(mut self, file: impl Into<FileRef>, text: &str) -> Self {
        self.entries
            .insert(file.into(), Entry::Text(Rope::from_str(text)));
        self
    }

    /// Add (or overwrite) a directory.
    pub fn with_directory(mut self, dir: impl Into<FileRef>) -> Self {
        self.entries.insert(dir.into(), Entry::Directory);
        self
    }

    /// Add (or overwrite) a global option.
    pub fn with_option(mut self, id: impl Into<String>, value: Value) -> Self {
        self.options.insert(id.into(), value);
        self
    }

    /// Returns the number of files and directories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the workspace holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current version; bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Text of `file`, if it is a text file.
    pub fn text(&self, file: &FileRef) -> Option<String> {
        match self.entries.get(file)? {
            Entry::Text(rope) => Some(rope.to_string()),
            Entry::Binary(_) | Entry::Directory => None,
        }
    }

    /// Bytes of `file`, if it is a binary file.
    pub fn bytes(&self, file: &FileRef) -> Option<&[u8]> {
        match self.entries.get(file)? {
            Entry::Binary(bytes) => Some(bytes),
            Entry::Text(_) | Entry::Directory => None,
        }
    }

    /// Returns `true` if `file` is a directory.
    pub fn is_directory(&self, file: &FileRef) -> bool {
        matches!(self.entries.get(file), Some(Entry::Directory))
    }

    /// All paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &FileRef> {
        self.entries.keys()
    }

    /// Messages shown so far, oldest first.
    pub fn messages(&self) -> &[(MessageKind, String)] {
        &self.messages
    }

    /// Open an editor session for a text file.
    pub fn open_session(&mut self, file: &FileRef) -> Result<SessionId, WorkspaceError> {
        if !matches!(self.entries.get(file), Some(Entry::Text(_))) {
            return Err(WorkspaceError::FileNotFound(file.clone()));
        }
        if self.sessions.contains_key(file) {
            return Err(WorkspaceError::SessionAlreadyOpen(file.clone()));
        }
        let id = SessionId(self.next_session_id);
        self.next_session_id = self.next_session_id.saturating_add(1);
        self.sessions.insert(file.clone(), Session::new(id));
        Ok(id)
    }

    /// Close a session.
    pub fn close_session(&mut self, id: SessionId) -> Result<(), WorkspaceError> {
        let Some(file) = self
            .sessions
            .iter()
            .find_map(|(file, session)| (session.id == id).then(|| file.clone()))
        else {
            return Err(WorkspaceError::SessionNotFound(id));
        };
        self.sessions.remove(&file);
        Ok(())
    }

    /// The session showing `file`.
    pub fn session(&self, file: &FileRef) -> Option<&Session> {
        self.sessions.get(file)
    }

    /// Subscribe to changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&WorkspaceChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify(&mut self, kind: WorkspaceChangeKind, file: Option<FileRef>) {
        let old_version = self.version;
        self.version = self.version.saturating_add(1);
        let change = WorkspaceChange {
            kind,
            file,
            old_version,
            new_version: self.version,
        };
        for cb in &mut self.callbacks {
            cb(&change);
        }
    }

    fn check_parent(&self, path: &FileRef) -> Result<(), HostError> {
        match path.parent() {
            Some(parent) => match self.entries.get(&parent) {
                Some(Entry::Text(_) | Entry::Binary(_)) => Err(HostError::NotADirectory(parent)),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }

    /// Paths at or below `path`.
    fn subtree(&self, path: &FileRef) -> Vec<FileRef> {
        let prefix = format!("{}/", path.as_str());
        self.entries
            .keys()
            .filter(|key| *key == path || key.as_str().starts_with(&prefix))
            .cloned()
            .collect()
    }
}

impl SnapshotProvider for Workspace {
    fn content(&self, file: &FileRef) -> Option<String> {
        self.text(file)
    }

    fn char_len(&self, file: &FileRef) -> Option<usize> {
        match self.entries.get(file)? {
            Entry::Text(rope) => Some(rope.len_chars()),
            Entry::Binary(_) | Entry::Directory => None,
        }
    }

    fn exists(&self, file: &FileRef) -> bool {
        self.entries.contains_key(file)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::from_files(self.entries.iter().filter_map(|(file, entry)| match entry {
            Entry::Text(rope) => Some((file.clone(), rope.to_string())),
            Entry::Binary(_) | Entry::Directory => None,
        }))
    }
}

impl DocumentWriter for Workspace {
    fn apply_patch(&mut self, file: &FileRef, patch: &TextPatch) -> Result<(), HostError> {
        let rope = match self.entries.get_mut(file) {
            Some(Entry::Text(rope)) => rope,
            Some(Entry::Binary(_) | Entry::Directory) => {
                return Err(HostError::NotText(file.clone()));
            }
            None => return Err(HostError::NotFound(file.clone())),
        };

        let mut patched = rope.clone();
        patch
            .apply_to_rope(&mut patched)
            .map_err(|source| HostError::Patch {
                file: file.clone(),
                source,
            })?;
        *rope = patched;

        self.notify(WorkspaceChangeKind::TextChanged, Some(file.clone()));
        Ok(())
    }

    fn create_file(&mut self, path: &FileRef, content: &FileContent) -> Result<(), HostError> {
        if self.entries.contains_key(path) {
            return Err(HostError::AlreadyExists(path.clone()));
        }
        self.check_parent(path)?;

        let entry = match content {
            FileContent::Text(text) => Entry::Text(Rope::from_str(text)),
            FileContent::Binary(bytes) => Entry::Binary(bytes.clone()),
            FileContent::Directory => Entry::Directory,
        };
        self.entries.insert(path.clone(), entry);
        self.notify(WorkspaceChangeKind::FileCreated, Some(path.clone()));
        Ok(())
    }

    fn delete_file(&mut self, file: &FileRef) -> Result<(), HostError> {
        if !self.entries.contains_key(file) {
            return Err(HostError::NotFound(file.clone()));
        }
        for path in self.subtree(file) {
            self.entries.remove(&path);
            self.sessions.remove(&path);
        }
        self.notify(WorkspaceChangeKind::FileDeleted, Some(file.clone()));
        Ok(())
    }

    fn move_file(&mut self, file: &FileRef, destination: &FileRef) -> Result<(), HostError> {
        if !self.entries.contains_key(file) {
            return Err(HostError::NotFound(file.clone()));
        }
        if destination == file
            || destination
                .as_str()
                .starts_with(&format!("{}/", file.as_str()))
        {
            return Err(HostError::MoveIntoSelf {
                file: file.clone(),
                destination: destination.clone(),
            });
        }
        if self.entries.contains_key(destination) {
            return Err(HostError::AlreadyExists(destination.clone()));
        }
        self.check_parent(destination)?;

        let source_len = file.as_str().len();
        for path in self.subtree(file) {
            let moved = FileRef::new(format!(
                "{}{}",
                destination.as_str(),
                &path.as_str()[source_len..]
            ));
            if let Some(entry) = self.entries.remove(&path) {
                self.entries.insert(moved.clone(), entry);
            }
            if let Some(session) = self.sessions.remove(&path) {
                self.sessions.insert(moved, session);
            }
        }
        self.notify(WorkspaceChangeKind::FileMoved, Some(destination.clone()));
        Ok(())
    }
}

impl SessionRegistry for Workspace {
    fn session_mut(&mut self, file: &FileRef) -> Option<&mut dyn EditorSession> {
        self.sessions
            .get_mut(file)
            .map(|session| session as &mut dyn EditorSession)
    }
}

impl OptionStore for Workspace {
    fn option(&self, id: &str) -> Option<Value> {
        self.options.get(id).cloned()
    }

    fn set_option(&mut self, id: &str, value: Value) {
        self.options.insert(id.to_string(), value);
        self.notify(WorkspaceChangeKind::OptionChanged, None);
    }
}

impl MessageSink for Workspace {
    fn show_message(&mut self, text: &str, kind: MessageKind) {
        self.messages.push((kind, text.to_string()));
        self.notify(WorkspaceChangeKind::MessageShown, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn file(path: &str) -> FileRef {
        FileRef::new(path)
    }

    #[test]
    fn test_apply_patch_bumps_version_and_notifies() {
        let mut workspace = Workspace::new().with_text("a.txt", "hello");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        workspace.subscribe(move |change| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(change.clone());
            }
        });

        let patch = TextPatch::between("hello", "hello world");
        workspace.apply_patch(&file("a.txt"), &patch).unwrap();

        assert_eq!(workspace.text(&file("a.txt")).as_deref(), Some("hello world"));
        assert_eq!(workspace.version(), 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, WorkspaceChangeKind::TextChanged);
        assert_eq!(seen[0].file, Some(file("a.txt")));
    }

    #[test]
    fn test_apply_patch_rejects_non_text() {
        let mut workspace = Workspace::new().with_directory("src");
        let patch = TextPatch::between("", "x");
        assert_eq!(
            workspace.apply_patch(&file("src"), &patch),
            Err(HostError::NotText(file("src")))
        );
        assert_eq!(
            workspace.apply_patch(&file("b.txt"), &patch),
            Err(HostError::NotFound(file("b.txt")))
        );
    }

    #[test]
    fn test_create_file_rules() {
        let mut workspace = Workspace::new().with_text("a.txt", "a");
        assert_eq!(
            workspace.create_file(&file("a.txt"), &FileContent::Text(String::new())),
            Err(HostError::AlreadyExists(file("a.txt")))
        );
        assert_eq!(
            workspace.create_file(&file("a.txt/b.txt"), &FileContent::Text(String::new())),
            Err(HostError::NotADirectory(file("a.txt")))
        );
        workspace
            .create_file(&file("img.png"), &FileContent::Binary(vec![1, 2]))
            .unwrap();
        assert_eq!(workspace.bytes(&file("img.png")), Some(&[1u8, 2][..]));
        assert!(workspace.text(&file("img.png")).is_none());
    }

    #[test]
    fn test_move_directory_moves_children_and_sessions() {
        let mut workspace = Workspace::new()
            .with_directory("old")
            .with_text("old/a.rs", "fn a() {}")
            .with_text("older/b.rs", "fn b() {}");
        let session = workspace.open_session(&file("old/a.rs")).unwrap();

        workspace.move_file(&file("old"), &file("new")).unwrap();

        assert!(workspace.is_directory(&file("new")));
        assert_eq!(workspace.text(&file("new/a.rs")).as_deref(), Some("fn a() {}"));
        assert_eq!(workspace.text(&file("older/b.rs")).as_deref(), Some("fn b() {}"));
        assert_eq!(workspace.session(&file("new/a.rs")).map(Session::id), Some(session));
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let mut workspace = Workspace::new()
            .with_directory("old")
            .with_text("old/a.rs", "fn a() {}");
        let version = workspace.version();

        assert_eq!(
            workspace.move_file(&file("old"), &file("old/sub")),
            Err(HostError::MoveIntoSelf {
                file: file("old"),
                destination: file("old/sub"),
            })
        );
        assert!(matches!(
            workspace.move_file(&file("old"), &file("old")),
            Err(HostError::MoveIntoSelf { .. })
        ));
        assert_eq!(
            workspace.paths().map(FileRef::as_str).collect::<Vec<_>>(),
            vec!["old", "old/a.rs"]
        );
        assert_eq!(workspace.version(), version);

        workspace.move_file(&file("old"), &file("older")).unwrap();
        assert_eq!(workspace.text(&file("older/a.rs")).as_deref(), Some("fn a() {}"));
    }

    #[test]
    fn test_delete_closes_sessions() {
        let mut workspace = Workspace::new().with_text("a.rs", "x");
        let id = workspace.open_session(&file("a.rs")).unwrap();
        workspace.delete_file(&file("a.rs")).unwrap();
        assert!(workspace.session(&file("a.rs")).is_none());
        assert_eq!(workspace.close_session(id), Err(WorkspaceError::SessionNotFound(id)));
    }

    #[test]
    fn test_session_version_tracks_changes() {
        let mut workspace = Workspace::new().with_text("a.rs", "abc");
        workspace.open_session(&file("a.rs")).unwrap();
        assert_eq!(
            workspace.open_session(&file("a.rs")),
            Err(WorkspaceError::SessionAlreadyOpen(file("a.rs")))
        );

        let session = workspace.session_mut(&file("a.rs")).unwrap();
        session.set_caret(2);
        session.set_caret(2);
        session.set_selection(Some(TextRange::new(0, 1)));
        assert_eq!(workspace.session(&file("a.rs")).map(Session::version), Some(2));
    }

    #[test]
    fn test_snapshot_contains_text_files_only() {
        let workspace = Workspace::new()
            .with_text("a.rs", "a")
            .with_directory("src");
        let snapshot = workspace.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.text(&file("a.rs")), Some("a"));
    }
}
