//! Read-only file snapshots for background computations.

use crate::FileRef;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable set of file contents.
///
/// Cloning is cheap and a snapshot can be moved to worker threads; nothing a computation does
/// through a snapshot can reach the live documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: Arc<BTreeMap<FileRef, Arc<str>>>,
}

impl Snapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(file, text)` pairs.
    pub fn from_files<I, T>(files: I) -> Self
    where
        I: IntoIterator<Item = (FileRef, T)>,
        T: Into<Arc<str>>,
    {
        Self {
            files: Arc::new(
                files
                    .into_iter()
                    .map(|(file, text)| (file, text.into()))
                    .collect(),
            ),
        }
    }

    /// A copy of this snapshot with `file` set to `text`.
    pub fn with_file(&self, file: FileRef, text: impl Into<Arc<str>>) -> Self {
        let mut files = (*self.files).clone();
        files.insert(file, text.into());
        Self {
            files: Arc::new(files),
        }
    }

    /// Text of `file`, if the snapshot contains it.
    pub fn text(&self, file: &FileRef) -> Option<&str> {
        self.files.get(file).map(|text| &**text)
    }

    /// Returns `true` if the snapshot contains `file`.
    pub fn contains(&self, file: &FileRef) -> bool {
        self.files.contains_key(file)
    }

    /// All files, sorted by path.
    pub fn files(&self) -> impl Iterator<Item = (&FileRef, &str)> {
        self.files.iter().map(|(file, text)| (file, &**text))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the snapshot has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
