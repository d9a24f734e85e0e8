//! Best-effort propagation of declaration changes to call sites.
//!
//! The declared name is the last identifier before the first `(` of a declaration. When an
//! [`UpdateReferences`] changes that name, every whole-word `old_name(` (whitespace allowed
//! before the parenthesis) in every text file is rewritten to `new_name(`. The declaration
//! itself is left alone. Anything smarter needs a language model of the source and is the
//! host's business.

use crate::host::SnapshotProvider;
use edit_command::{
    Command, RecordError, SearchOptions, TextRange, UpdateReferences, char_slice, find_all,
    is_word_char, record,
};

/// The last identifier before the first `(` of `declaration`.
pub fn declared_name(declaration: &str) -> Option<&str> {
    let head = declaration.split('(').next()?.trim_end();
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, ch)| is_word_char(*ch))
        .last()
        .map(|(index, _)| index)?;
    Some(&head[start..])
}

/// Ranges of `name` followed by an opening parenthesis.
pub fn call_sites(text: &str, name: &str) -> Result<Vec<TextRange>, RecordError> {
    let chars: Vec<char> = text.chars().collect();
    Ok(find_all(text, name, SearchOptions::identifier())?
        .into_iter()
        .filter(|range| {
            chars[range.end..]
                .iter()
                .find(|ch| !ch.is_whitespace())
                .is_some_and(|ch| *ch == '(')
        })
        .collect())
}

/// Compute the call-site rewrite for `references` against the provider's current content.
///
/// Returns [`Command::nop`] when the target is missing, either name cannot be derived, or the
/// name did not change.
pub fn propagate<P>(provider: &P, references: &UpdateReferences) -> Command
where
    P: SnapshotProvider + ?Sized,
{
    let Some(live) = provider.content(&references.target) else {
        tracing::warn!(file = %references.target, "reference target is gone");
        return Command::nop();
    };
    let old_decl = char_slice(&references.old_text, references.old_decl_range);
    let new_decl = char_slice(&live, references.new_decl_range);
    let (Some(old_name), Some(new_name)) = (declared_name(old_decl), declared_name(new_decl))
    else {
        tracing::debug!("no declared name, skipping reference update");
        return Command::nop();
    };
    if old_name == new_name {
        return Command::nop();
    }
    tracing::debug!(old_name, new_name, "propagating rename to call sites");

    let snapshot = provider.snapshot();
    record(&snapshot, |recorder| {
        let files: Vec<_> = snapshot.files().map(|(file, _)| file.clone()).collect();
        for file in files {
            let text = snapshot.text(&file).unwrap_or_default();
            let mut sites = call_sites(text, old_name)?;
            if file == references.target {
                sites.retain(|site| !site.overlaps(&references.new_decl_range));
            }
            if sites.is_empty() {
                continue;
            }
            let doc = recorder.writable(&file)?;
            for site in sites.iter().rev() {
                doc.replace(*site, new_name)?;
            }
        }
        Ok(())
    })
}
