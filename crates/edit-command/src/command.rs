//! Command variants.
//!
//! A [`Command`] is an immutable description of an effect: a text update, a file operation, a
//! navigation, a user interaction, and so on. Commands are produced by analysis code against a
//! private snapshot, combined with the algebra in [`crate::algebra`], and consumed exactly once by
//! an executor.
//!
//! # Example
//!
//! ```rust
//! use edit_command::{Command, FileRef, TextRange};
//!
//! let file = FileRef::new("src/lib.rs");
//! let command = Command::replace_text(file.clone(), "fn a() {}", "fn b() {}")
//!     .and_then(Command::select(file.clone(), TextRange::new(3, 4)));
//!
//! assert_eq!(command.unpack().len(), 2);
//! assert!(command.modified_files().contains(&file));
//! ```

use crate::continuation::Continuation;
use crate::patch::{Fragment, PatchError, TextPatch};
use crate::text::TextRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Identity of a file, as a `/`-separated path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
    /// Create a file reference from a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path of a child named `name`.
    pub fn join(&self, name: &str) -> FileRef {
        if self.0.is_empty() {
            FileRef::new(name)
        } else {
            FileRef::new(format!("{}/{}", self.0.trim_end_matches('/'), name))
        }
    }

    /// The parent directory, if the path has one.
    pub fn parent(&self) -> Option<FileRef> {
        self.0.rsplit_once('/').map(|(parent, _)| FileRef::new(parent))
    }

    /// The last path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A range inside a file, used to name the element a conflict is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// File containing the element.
    pub file: FileRef,
    /// Character range of the element.
    pub range: TextRange,
}

/// Severity of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Informational message.
    Info,
    /// Error message; batch execution stops on it.
    Error,
}

/// Visual style of a highlighted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HighlightStyle {
    /// Informational emphasis.
    Information,
    /// Warning emphasis.
    Warning,
    /// Error emphasis.
    Error,
    /// Search-result emphasis.
    Search,
}

/// How many candidates a [`ChooseMany`] selection may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionMode {
    /// Exactly one.
    Single,
    /// Zero or one.
    SingleOrEmpty,
    /// One or more.
    Multiple,
    /// Any number.
    MultipleOrEmpty,
}

impl SelectionMode {
    /// Returns `true` if a selection of `count` candidates is allowed.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Single => count == 1,
            Self::SingleOrEmpty => count <= 1,
            Self::Multiple => count >= 1,
            Self::MultipleOrEmpty => true,
        }
    }
}

/// Content of a file created by [`CreateFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// A text file.
    Text(String),
    /// A binary file.
    Binary(Vec<u8>),
    /// A directory.
    Directory,
}

/// Invariant violations detected while constructing a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The fragment list of a text update is malformed.
    #[error(transparent)]
    Patch(#[from] PatchError),
    /// A default selection names something that is not a candidate.
    #[error("default selection `{0}` is not one of the candidates")]
    UnknownDefault(String),
    /// Two template fields overlap.
    #[error("template fields `{first}` and `{second}` overlap")]
    OverlappingFields {
        /// Name of the earlier field.
        first: String,
        /// Name of the later field.
        second: String,
    },
    /// Two template fields share a name.
    #[error("template field `{0}` is defined twice")]
    DuplicateField(String),
    /// A dependent template field refers to a field that does not exist.
    #[error("template field `{field}` depends on unknown field `{source_field}`")]
    UnknownSource {
        /// The dependent field.
        field: String,
        /// The missing source.
        source_field: String,
    },
    /// Dependent template fields mirror each other in a loop.
    #[error("template field `{0}` depends on itself")]
    CyclicDependency(String),
}

/// Replace the text of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateText {
    target: FileRef,
    patch: TextPatch,
}

impl UpdateText {
    /// Create a text update from explicit fragments.
    pub fn new(
        target: FileRef,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
        fragments: Vec<Fragment>,
    ) -> Result<Self, CommandError> {
        Ok(Self {
            target,
            patch: TextPatch::new(old_text, new_text, fragments)?,
        })
    }

    /// Create a text update from a finished patch.
    pub fn from_patch(target: FileRef, patch: TextPatch) -> Self {
        Self { target, patch }
    }

    /// The file being updated.
    pub fn target(&self) -> &FileRef {
        &self.target
    }

    /// The text the update was computed against.
    pub fn old_text(&self) -> &str {
        self.patch.old_text()
    }

    /// The text after the update.
    pub fn new_text(&self) -> &str {
        self.patch.new_text()
    }

    /// Changed sub-ranges.
    pub fn fragments(&self) -> &[Fragment] {
        self.patch.fragments()
    }

    /// The underlying patch.
    pub fn patch(&self) -> &TextPatch {
        &self.patch
    }

    /// Merge with an update applied right after this one, if both target the same file and
    /// `next` was computed against this update's result.
    pub fn merge_with_next(&self, next: &UpdateText) -> Option<UpdateText> {
        if self.target != next.target {
            return None;
        }
        let patch = self.patch.merge_with_next(&next.patch)?;
        Some(Self::from_patch(self.target.clone(), patch))
    }
}

/// Create a file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFile {
    /// Directory the file is created in.
    pub parent: FileRef,
    /// Name of the new file.
    pub name: String,
    /// Optional file type hint (for example a language id).
    pub kind_hint: Option<String>,
    /// Initial content.
    pub content: FileContent,
}

impl CreateFile {
    /// Full path of the created file.
    pub fn path(&self) -> FileRef {
        self.parent.join(&self.name)
    }
}

/// Delete a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFile {
    /// File to delete.
    pub target: FileRef,
}

/// Move or rename a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveFile {
    /// File to move.
    pub target: FileRef,
    /// New path of the file.
    pub destination: FileRef,
}

/// Move the caret and/or selection of a live editor session. `None` leaves a value unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigate {
    /// File whose session is navigated.
    pub target: FileRef,
    /// New selection start.
    pub selection_start: Option<usize>,
    /// New selection end.
    pub selection_end: Option<usize>,
    /// New caret offset.
    pub caret: Option<usize>,
}

/// Highlight ranges in a live editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// File whose session shows the highlights.
    pub target: FileRef,
    /// Ranges and their styles.
    pub ranges: Vec<(TextRange, HighlightStyle)>,
}

/// Show a message to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message text.
    pub text: String,
    /// Severity.
    pub kind: MessageKind,
}

/// Report conflicts and ask the user whether to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowConflicts {
    /// Conflict descriptions per element.
    pub conflicts: BTreeMap<ElementRef, Vec<String>>,
}

/// One entry of a [`ChooseOne`] list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceAction {
    /// Presentable name.
    pub name: String,
    /// Command to run when this entry is chosen.
    pub continuation: Continuation<()>,
}

impl ChoiceAction {
    /// An action that runs a fixed command.
    pub fn new(name: impl Into<String>, command: Command) -> Self {
        Self {
            name: name.into(),
            continuation: Continuation::constant(command),
        }
    }

    /// An action whose command is computed only when it is chosen.
    pub fn lazy<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Command + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            continuation: Continuation::new(move |()| f()),
        }
    }
}

/// Let the user pick one action from a list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChooseOne {
    /// Title of the list.
    pub title: String,
    /// Actions in presentation order.
    pub actions: Vec<ChoiceAction>,
}

/// Let the user pick a subset of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChooseMany {
    title: String,
    candidates: Vec<String>,
    default_selection: Vec<String>,
    mode: SelectionMode,
    continuation: Continuation<Vec<String>>,
}

impl ChooseMany {
    /// Create a chooser. Every default must be one of the candidates.
    pub fn new(
        title: impl Into<String>,
        candidates: Vec<String>,
        default_selection: Vec<String>,
        mode: SelectionMode,
        continuation: Continuation<Vec<String>>,
    ) -> Result<Self, CommandError> {
        if let Some(unknown) = default_selection
            .iter()
            .find(|default| !candidates.contains(default))
        {
            return Err(CommandError::UnknownDefault(unknown.clone()));
        }
        Ok(Self {
            title: title.into(),
            candidates,
            default_selection,
            mode,
            continuation,
        })
    }

    /// Title of the chooser.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// All candidates in presentation order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Candidates selected by default.
    pub fn default_selection(&self) -> &[String] {
        &self.default_selection
    }

    /// Allowed selection size.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Next step, given the chosen candidates.
    pub fn continuation(&self) -> &Continuation<Vec<String>> {
        &self.continuation
    }

    pub(crate) fn with_continuation(&self, continuation: Continuation<Vec<String>>) -> Self {
        Self {
            continuation,
            ..self.clone()
        }
    }
}

/// Produces a fresh default options value.
#[derive(Clone)]
pub struct OptionsFactory(Arc<dyn Fn() -> Value + Send + Sync>);

impl OptionsFactory {
    /// Wrap a factory function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Create a fresh default value.
    pub fn create(&self) -> Value {
        (self.0)()
    }
}

impl PartialEq for OptionsFactory {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for OptionsFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionsFactory(..)")
    }
}

/// Let the user edit an options object, then continue with the edited value.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOptions {
    /// Dialog title.
    pub title: String,
    /// Default options.
    pub factory: OptionsFactory,
    /// Whether batch execution may proceed with the defaults.
    pub allow_defaults_in_batch: bool,
    /// Next step, given the edited options.
    pub continuation: Continuation<Value>,
}

/// A field of a live template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateField {
    /// A field whose initial value is an evaluated expression.
    Expression {
        /// Range the field occupies.
        range: TextRange,
        /// Field name.
        name: String,
        /// Value the expression evaluates to.
        default: String,
    },
    /// A field that mirrors another field.
    Dependent {
        /// Range the field occupies.
        range: TextRange,
        /// Field name.
        name: String,
        /// Name of the field it mirrors.
        source: String,
    },
}

impl TemplateField {
    /// Range the field occupies.
    pub fn range(&self) -> TextRange {
        match self {
            Self::Expression { range, .. } | Self::Dependent { range, .. } => *range,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Expression { name, .. } | Self::Dependent { name, .. } => name,
        }
    }
}

/// Field values of a finished template, keyed by field name.
pub type TemplateValues = BTreeMap<String, String>;

/// Start a live template in a file, then continue with the final field values.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTemplate {
    target: FileRef,
    fields: Vec<TemplateField>,
    continuation: Continuation<TemplateValues>,
}

impl StartTemplate {
    /// Create a template. Fields are sorted by range; they must not overlap, names must be
    /// unique and every dependent field must lead, possibly through other dependent fields, to
    /// an expression field.
    pub fn new(
        target: FileRef,
        mut fields: Vec<TemplateField>,
        continuation: Continuation<TemplateValues>,
    ) -> Result<Self, CommandError> {
        fields.sort_by_key(|field| field.range());
        for pair in fields.windows(2) {
            if pair[0].range().overlaps(&pair[1].range()) {
                return Err(CommandError::OverlappingFields {
                    first: pair[0].name().to_string(),
                    second: pair[1].name().to_string(),
                });
            }
        }
        let mut names = BTreeSet::new();
        for field in &fields {
            if !names.insert(field.name()) {
                return Err(CommandError::DuplicateField(field.name().to_string()));
            }
        }
        for field in &fields {
            if let TemplateField::Dependent { name, source, .. } = field {
                if !names.contains(source.as_str()) {
                    return Err(CommandError::UnknownSource {
                        field: name.clone(),
                        source_field: source.clone(),
                    });
                }
            }
        }
        for field in &fields {
            expression_source(&fields, field.name())?;
        }
        Ok(Self {
            target,
            fields,
            continuation,
        })
    }

    /// File the template runs in.
    pub fn target(&self) -> &FileRef {
        &self.target
    }

    /// Fields sorted by range.
    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    /// Next step, given the final field values.
    pub fn continuation(&self) -> &Continuation<TemplateValues> {
        &self.continuation
    }

    /// Complete a set of user-provided values: expression fields without a value get their
    /// default, dependent fields copy the expression field their source chain ends at.
    pub fn resolve_values(&self, mut values: TemplateValues) -> TemplateValues {
        for field in &self.fields {
            if let TemplateField::Expression { name, default, .. } = field {
                values.entry(name.clone()).or_insert_with(|| default.clone());
            }
        }
        for field in &self.fields {
            if let TemplateField::Dependent { name, .. } = field {
                let value = expression_source(&self.fields, name)
                    .ok()
                    .and_then(|root| values.get(root).cloned())
                    .unwrap_or_default();
                values.insert(name.clone(), value);
            }
        }
        values
    }

    /// Values used when nobody edits the template.
    pub fn default_values(&self) -> TemplateValues {
        self.resolve_values(TemplateValues::new())
    }

    pub(crate) fn with_continuation(&self, continuation: Continuation<TemplateValues>) -> Self {
        Self {
            continuation,
            ..self.clone()
        }
    }
}

/// Follow `name` through dependent fields to the expression field it mirrors.
fn expression_source<'f>(fields: &'f [TemplateField], name: &'f str) -> Result<&'f str, CommandError> {
    let mut seen = BTreeSet::new();
    let mut current = name;
    loop {
        match fields.iter().find(|field| field.name() == current) {
            Some(TemplateField::Expression { .. }) => return Ok(current),
            Some(TemplateField::Dependent { source, .. }) => {
                if !seen.insert(current) {
                    return Err(CommandError::CyclicDependency(name.to_string()));
                }
                current = source;
            }
            None => {
                return Err(CommandError::UnknownSource {
                    field: name.to_string(),
                    source_field: current.to_string(),
                });
            }
        }
    }
}

/// Start an in-place rename of the element at `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    /// File containing the element.
    pub target: FileRef,
    /// Range of the element's name.
    pub range: TextRange,
    /// Suggested new names, best first.
    pub suggestions: Vec<String>,
}

/// One global option change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionUpdate {
    /// Option identifier.
    pub id: String,
    /// Value the update was computed against.
    pub old_value: Value,
    /// Value to store.
    pub new_value: Value,
}

/// Propagate a declaration change to its call sites (best effort).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReferences {
    /// File containing the declaration.
    pub target: FileRef,
    /// Text of the file before the declaration changed.
    pub old_text: String,
    /// Declaration range in `old_text`.
    pub old_decl_range: TextRange,
    /// Declaration range in the current text.
    pub new_decl_range: TextRange,
}

/// A flat sequence of non-empty leaf commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite(pub(crate) Vec<Command>);

impl Composite {
    /// The leaves in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.0
    }
}

/// An immutable description of an effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace a file's text.
    UpdateText(UpdateText),
    /// Create a file or directory.
    CreateFile(CreateFile),
    /// Delete a file.
    DeleteFile(DeleteFile),
    /// Move a file.
    MoveFile(MoveFile),
    /// Move caret/selection.
    Navigate(Navigate),
    /// Highlight ranges.
    Highlight(Highlight),
    /// Show a message.
    Message(Message),
    /// Report conflicts and ask for confirmation.
    ShowConflicts(ShowConflicts),
    /// Pick one action.
    ChooseOne(ChooseOne),
    /// Pick several candidates.
    ChooseMany(ChooseMany),
    /// Edit an options object.
    EditOptions(EditOptions),
    /// Run a live template.
    StartTemplate(StartTemplate),
    /// Start an in-place rename.
    RenameRequest(RenameRequest),
    /// Change global options.
    UpdateOptions(Vec<OptionUpdate>),
    /// Propagate a declaration change.
    UpdateReferences(UpdateReferences),
    /// Several leaves, in order.
    Composite(Composite),
    /// Do nothing.
    Nop,
}

macro_rules! impl_from_leaf {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Command {
                fn from(value: $variant) -> Self {
                    Command::$variant(value)
                }
            }
        )*
    };
}

impl_from_leaf!(
    UpdateText,
    CreateFile,
    DeleteFile,
    MoveFile,
    Navigate,
    Highlight,
    Message,
    ShowConflicts,
    ChooseOne,
    ChooseMany,
    EditOptions,
    StartTemplate,
    RenameRequest,
    UpdateReferences,
);

impl Command {
    /// The command that does nothing.
    pub fn nop() -> Self {
        Self::Nop
    }

    /// Replace `old_text` with `new_text` in `target`, with explicit fragments.
    pub fn update_text(
        target: FileRef,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
        fragments: Vec<Fragment>,
    ) -> Result<Self, CommandError> {
        UpdateText::new(target, old_text, new_text, fragments).map(Self::UpdateText)
    }

    /// Replace `old_text` with `new_text` in `target`, computing the changed range.
    pub fn replace_text(
        target: FileRef,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self {
        Self::UpdateText(UpdateText::from_patch(
            target,
            TextPatch::between(old_text, new_text),
        ))
    }

    /// Create a text file.
    pub fn create_file(parent: FileRef, name: impl Into<String>, content: FileContent) -> Self {
        Self::CreateFile(CreateFile {
            parent,
            name: name.into(),
            kind_hint: None,
            content,
        })
    }

    /// Delete a file.
    pub fn delete_file(target: FileRef) -> Self {
        Self::DeleteFile(DeleteFile { target })
    }

    /// Move a file.
    pub fn move_file(target: FileRef, destination: FileRef) -> Self {
        Self::MoveFile(MoveFile {
            target,
            destination,
        })
    }

    /// Put the caret at `offset`.
    pub fn caret(target: FileRef, offset: usize) -> Self {
        Self::Navigate(Navigate {
            target,
            selection_start: None,
            selection_end: None,
            caret: Some(offset),
        })
    }

    /// Select `range`, with the caret at its end.
    pub fn select(target: FileRef, range: TextRange) -> Self {
        Self::Navigate(Navigate {
            target,
            selection_start: Some(range.start),
            selection_end: Some(range.end),
            caret: Some(range.end),
        })
    }

    /// Highlight ranges with one style.
    pub fn highlight(target: FileRef, ranges: Vec<TextRange>, style: HighlightStyle) -> Self {
        Self::Highlight(Highlight {
            target,
            ranges: ranges.into_iter().map(|range| (range, style)).collect(),
        })
    }

    /// An informational message.
    pub fn info(text: impl Into<String>) -> Self {
        Self::Message(Message {
            text: text.into(),
            kind: MessageKind::Info,
        })
    }

    /// An error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::Message(Message {
            text: text.into(),
            kind: MessageKind::Error,
        })
    }

    /// Report conflicts.
    pub fn show_conflicts(conflicts: BTreeMap<ElementRef, Vec<String>>) -> Self {
        Self::ShowConflicts(ShowConflicts { conflicts })
    }

    /// Pick one of several actions.
    pub fn choose_one(title: impl Into<String>, actions: Vec<ChoiceAction>) -> Self {
        Self::ChooseOne(ChooseOne {
            title: title.into(),
            actions,
        })
    }

    /// Edit an options object.
    pub fn edit_options(
        title: impl Into<String>,
        factory: OptionsFactory,
        allow_defaults_in_batch: bool,
        continuation: Continuation<Value>,
    ) -> Self {
        Self::EditOptions(EditOptions {
            title: title.into(),
            factory,
            allow_defaults_in_batch,
            continuation,
        })
    }

    /// Start an in-place rename.
    pub fn rename(target: FileRef, range: TextRange, suggestions: Vec<String>) -> Self {
        Self::RenameRequest(RenameRequest {
            target,
            range,
            suggestions,
        })
    }

    /// Change one global option.
    pub fn update_option(id: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self::UpdateOptions(vec![OptionUpdate {
            id: id.into(),
            old_value,
            new_value,
        }])
    }

    /// Change several global options at once.
    pub fn update_options(updates: Vec<OptionUpdate>) -> Self {
        Self::UpdateOptions(updates)
    }

    /// Propagate a declaration change to its call sites.
    pub fn update_references(
        target: FileRef,
        old_text: impl Into<String>,
        old_decl_range: TextRange,
        new_decl_range: TextRange,
    ) -> Self {
        Self::UpdateReferences(UpdateReferences {
            target,
            old_text: old_text.into(),
            old_decl_range,
            new_decl_range,
        })
    }

    /// Short name of the variant, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::UpdateText(_) => "update_text",
            Self::CreateFile(_) => "create_file",
            Self::DeleteFile(_) => "delete_file",
            Self::MoveFile(_) => "move_file",
            Self::Navigate(_) => "navigate",
            Self::Highlight(_) => "highlight",
            Self::Message(_) => "message",
            Self::ShowConflicts(_) => "show_conflicts",
            Self::ChooseOne(_) => "choose_one",
            Self::ChooseMany(_) => "choose_many",
            Self::EditOptions(_) => "edit_options",
            Self::StartTemplate(_) => "start_template",
            Self::RenameRequest(_) => "rename_request",
            Self::UpdateOptions(_) => "update_options",
            Self::UpdateReferences(_) => "update_references",
            Self::Composite(_) => "composite",
            Self::Nop => "nop",
        }
    }
}
