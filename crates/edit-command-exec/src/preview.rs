//! Applying commands to isolated copies, and describing what a command would do.

use edit_command::{Command, FileContent, FileRef, PatchError, Snapshot};
use thiserror::Error;

/// Why a command cannot be applied to an isolated copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// The command changes a file other than the copied one.
    #[error("command modifies `{0}`, which is not the previewed file")]
    OtherFile(FileRef),
    /// The command carries a leaf that only makes sense against a live workspace.
    #[error("`{kind}` commands cannot be applied to a copy")]
    Unsupported {
        /// Kind of the offending leaf.
        kind: &'static str,
    },
    /// The copy's text is not the text the command was computed against.
    #[error("`{file}` does not match the text the command was computed against")]
    Mismatch {
        /// The copied file.
        file: FileRef,
    },
    /// A text update could not be applied.
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Apply the text updates of `command` that target `file` to `text`.
///
/// Navigation, highlights, messages and rename requests are ignored. Anything that touches
/// another file, the file system, options or references, or that needs a user, is an error.
pub fn apply_to_copy(command: &Command, file: &FileRef, text: &str) -> Result<String, PreviewError> {
    let mut current = text.to_string();
    for leaf in command.unpack() {
        match leaf {
            Command::UpdateText(update) => {
                if update.target() != file {
                    return Err(PreviewError::OtherFile(update.target().clone()));
                }
                if current != update.old_text() {
                    return Err(PreviewError::Mismatch { file: file.clone() });
                }
                current = update.patch().apply_to(&current)?;
            }
            Command::Navigate(_)
            | Command::Highlight(_)
            | Command::Message(_)
            | Command::RenameRequest(_)
            | Command::Nop => {}
            other => {
                return Err(PreviewError::Unsupported {
                    kind: other.kind_name(),
                });
            }
        }
    }
    Ok(current)
}

/// What a command would do, for showing before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// The command changes or creates one text file.
    Diff {
        /// The changed file.
        file: FileRef,
        /// Text before; empty for a created file.
        old_text: String,
        /// Text after.
        new_text: String,
    },
    /// The command only shows a message.
    Message(String),
    /// Nothing worth previewing.
    Empty,
}

/// Describe `command` against `snapshot`.
pub fn preview(command: &Command, snapshot: &Snapshot) -> Preview {
    let leaves = command.unpack();
    if let [Command::Message(message)] = leaves.as_slice() {
        return Preview::Message(message.text.clone());
    }

    let mut modified = command.modified_files().into_iter();
    let (Some(file), None) = (modified.next(), modified.next()) else {
        return Preview::Empty;
    };

    let created = leaves.iter().find_map(|leaf| match leaf {
        Command::CreateFile(create) if create.path() == file => Some(create),
        _ => None,
    });
    if let Some(create) = created {
        let FileContent::Text(content) = &create.content else {
            return Preview::Empty;
        };
        let rest = Command::from_leaves(
            leaves
                .iter()
                .filter(|leaf| !matches!(leaf, Command::CreateFile(_)))
                .cloned()
                .collect(),
        );
        return match apply_to_copy(&rest, &file, content) {
            Ok(new_text) => Preview::Diff {
                file,
                old_text: String::new(),
                new_text,
            },
            Err(err) => {
                tracing::debug!(%err, "no preview for created file");
                Preview::Empty
            }
        };
    }

    let Some(old_text) = snapshot.text(&file) else {
        return Preview::Empty;
    };
    match apply_to_copy(command, &file, old_text) {
        Ok(new_text) => Preview::Diff {
            old_text: old_text.to_string(),
            file,
            new_text,
        },
        Err(err) => {
            tracing::debug!(%err, file = %file, "no preview");
            Preview::Empty
        }
    }
}
