//! JSON projection of commands.
//!
//! Every inspectable field of a [`Command`] is exported; continuations and option factories
//! are functions and are left out. "Unchanged" navigation fields are written as `-1`.

use crate::Command;
use crate::command::{FileContent, TemplateField};
use crate::text::TextRange;
use serde_json::{Value, json};

fn range_json(range: TextRange) -> Value {
    json!({ "start": range.start, "end": range.end })
}

fn offset_json(offset: Option<usize>) -> Value {
    offset.map_or(json!(-1), |offset| json!(offset))
}

impl Command {
    /// Export this command as a JSON value tagged with `"kind"`.
    pub fn to_json(&self) -> Value {
        match self {
            Command::UpdateText(update) => json!({
                "kind": "updateText",
                "target": update.target(),
                "oldText": update.old_text(),
                "newText": update.new_text(),
                "fragments": update.fragments(),
            }),
            Command::CreateFile(create) => {
                let content = match &create.content {
                    FileContent::Text(text) => json!({ "text": text }),
                    FileContent::Binary(bytes) => json!({ "binary": bytes.len() }),
                    FileContent::Directory => json!("directory"),
                };
                json!({
                    "kind": "createFile",
                    "parent": create.parent,
                    "name": create.name,
                    "kindHint": create.kind_hint,
                    "content": content,
                })
            }
            Command::DeleteFile(delete) => json!({
                "kind": "deleteFile",
                "target": delete.target,
            }),
            Command::MoveFile(moved) => json!({
                "kind": "moveFile",
                "target": moved.target,
                "destination": moved.destination,
            }),
            Command::Navigate(navigate) => json!({
                "kind": "navigate",
                "target": navigate.target,
                "selectionStart": offset_json(navigate.selection_start),
                "selectionEnd": offset_json(navigate.selection_end),
                "caret": offset_json(navigate.caret),
            }),
            Command::Highlight(highlight) => json!({
                "kind": "highlight",
                "target": highlight.target,
                "ranges": highlight
                    .ranges
                    .iter()
                    .map(|(range, style)| json!({ "range": range_json(*range), "style": style }))
                    .collect::<Vec<_>>(),
            }),
            Command::Message(message) => json!({
                "kind": "message",
                "text": message.text,
                "messageKind": message.kind,
            }),
            Command::ShowConflicts(conflicts) => json!({
                "kind": "showConflicts",
                "conflicts": conflicts
                    .conflicts
                    .iter()
                    .map(|(element, messages)| json!({
                        "file": element.file,
                        "range": range_json(element.range),
                        "messages": messages,
                    }))
                    .collect::<Vec<_>>(),
            }),
            Command::ChooseOne(choose) => json!({
                "kind": "chooseOne",
                "title": choose.title,
                "actions": choose.actions.iter().map(|action| &action.name).collect::<Vec<_>>(),
            }),
            Command::ChooseMany(choose) => json!({
                "kind": "chooseMany",
                "title": choose.title(),
                "candidates": choose.candidates(),
                "defaultSelection": choose.default_selection(),
                "mode": choose.mode(),
            }),
            Command::EditOptions(options) => json!({
                "kind": "editOptions",
                "title": options.title,
                "defaults": options.factory.create(),
                "allowDefaultsInBatch": options.allow_defaults_in_batch,
            }),
            Command::StartTemplate(template) => json!({
                "kind": "startTemplate",
                "target": template.target(),
                "fields": template.fields().iter().map(field_json).collect::<Vec<_>>(),
            }),
            Command::RenameRequest(rename) => json!({
                "kind": "renameRequest",
                "target": rename.target,
                "range": range_json(rename.range),
                "suggestions": rename.suggestions,
            }),
            Command::UpdateOptions(updates) => json!({
                "kind": "updateOptions",
                "updates": updates,
            }),
            Command::UpdateReferences(references) => json!({
                "kind": "updateReferences",
                "target": references.target,
                "oldText": references.old_text,
                "oldDeclRange": range_json(references.old_decl_range),
                "newDeclRange": range_json(references.new_decl_range),
            }),
            Command::Composite(composite) => json!({
                "kind": "composite",
                "commands": composite.commands().iter().map(Command::to_json).collect::<Vec<_>>(),
            }),
            Command::Nop => json!({ "kind": "nop" }),
        }
    }
}

fn field_json(field: &TemplateField) -> Value {
    match field {
        TemplateField::Expression {
            range,
            name,
            default,
        } => json!({
            "type": "expression",
            "name": name,
            "range": range_json(*range),
            "default": default,
        }),
        TemplateField::Dependent {
            range,
            name,
            source,
        } => json!({
            "type": "dependent",
            "name": name,
            "range": range_json(*range),
            "source": source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{Command, FileRef, Fragment, TextRange};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_update_text_json() {
        let command = Command::update_text(
            FileRef::new("a.c"),
            "a{}b",
            "a{ }b",
            vec![Fragment::new(2, 0, 1)],
        )
        .unwrap();
        assert_eq!(
            command.to_json(),
            json!({
                "kind": "updateText",
                "target": "a.c",
                "oldText": "a{}b",
                "newText": "a{ }b",
                "fragments": [{ "offset": 2, "oldLength": 0, "newLength": 1 }],
            })
        );
    }

    #[test]
    fn test_navigate_json_uses_sentinel() {
        let command = Command::caret(FileRef::new("a.c"), 3)
            .and_then(Command::select(FileRef::new("b.c"), TextRange::new(1, 2)));
        let value = command.to_json();
        assert_eq!(value["kind"], "composite");
        assert_eq!(value["commands"][0]["selectionStart"], -1);
        assert_eq!(value["commands"][0]["caret"], 3);
        assert_eq!(value["commands"][1]["selectionEnd"], 2);
    }

    #[test]
    fn test_message_json() {
        assert_eq!(
            Command::error("boom").to_json(),
            json!({ "kind": "message", "text": "boom", "messageKind": "ERROR" })
        );
    }
}
