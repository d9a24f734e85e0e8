//! Text patches.
//!
//! A [`TextPatch`] describes a single file's change as the full old text, the full new text and
//! a sorted list of [`Fragment`]s naming the sub-ranges that differ.
//!
//! Fragment coordinates:
//! - `offset` is a character offset in the **new** text.
//! - Fragments are applied **in order**; when fragment `i` is applied, every earlier fragment has
//!   already been applied, so `offset` is valid both in the partially patched text and in the
//!   final text.
//! - A sorted list never has two fragments that overlap or touch:
//!   `fragments[i + 1].offset > fragments[i].offset + fragments[i].new_length`.

use crate::text::{char_len, common_prefix, common_suffix};
use ropey::Rope;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One changed sub-range of a [`TextPatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Start character offset (new-text coordinates).
    pub offset: usize,
    /// Number of characters removed from the text the fragment is applied to.
    pub old_length: usize,
    /// Number of characters inserted in their place.
    pub new_length: usize,
}

impl Fragment {
    /// Create a fragment.
    pub fn new(offset: usize, old_length: usize, new_length: usize) -> Self {
        Self {
            offset,
            old_length,
            new_length,
        }
    }

    /// Exclusive end of the replaced range, before the fragment is applied.
    pub fn old_end(&self) -> usize {
        self.offset + self.old_length
    }

    /// Exclusive end of the inserted range, after the fragment is applied.
    pub fn new_end(&self) -> usize {
        self.offset + self.new_length
    }

    /// Signed length change introduced by this fragment.
    pub fn delta(&self) -> isize {
        self.new_length as isize - self.old_length as isize
    }

    /// Map an offset from before this fragment to after it.
    ///
    /// Offsets inside the closed replaced range `[offset, offset + old_length]` collapse to the
    /// fragment start, or to the end of the inserted text when `lean_right` is set.
    pub fn translate_offset(&self, offset: usize, lean_right: bool) -> usize {
        if offset < self.offset {
            offset
        } else if offset > self.old_end() {
            offset - self.old_length + self.new_length
        } else if lean_right {
            self.new_end()
        } else {
            self.offset
        }
    }

    /// Returns `true` if this fragment's closed new range overlaps `next`'s closed old range.
    ///
    /// `next` is expected to apply to the text this fragment produces.
    pub fn intersects(&self, next: &Fragment) -> bool {
        self.offset <= next.old_end() && next.offset <= self.new_end()
    }

    /// Combine this fragment with `next`, applied right after it, into one fragment spanning
    /// both.
    pub fn merge_with_next(&self, next: &Fragment) -> Fragment {
        let start = self.offset.min(next.offset);
        let end = self.new_end().max(next.old_end());
        let span = end - start;
        Fragment {
            offset: start,
            old_length: span - self.new_length + self.old_length,
            new_length: span - next.old_length + next.new_length,
        }
    }

    fn shifted(&self, delta: isize) -> Fragment {
        Fragment {
            offset: self.offset.saturating_add_signed(delta),
            ..*self
        }
    }
}

/// Invariant violations detected while constructing a [`TextPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A fragment's inserted range runs past the end of the new text.
    #[error("fragment {index} ends at {end}, past the new text length {len}")]
    OutOfBounds {
        /// Index of the offending fragment.
        index: usize,
        /// Exclusive end of its inserted range.
        end: usize,
        /// Length of the new text in characters.
        len: usize,
    },
    /// A fragment starts at or before the end of the previous one.
    #[error("fragment {index} overlaps or touches the previous fragment")]
    Unordered {
        /// Index of the offending fragment.
        index: usize,
    },
    /// A fragment removes characters past the end of the text it is applied to.
    #[error("fragment {index} removes past the end of the text")]
    RemovedPastEnd {
        /// Index of the offending fragment.
        index: usize,
    },
    /// Applying the fragments to the old text does not produce the new text.
    #[error("fragments do not transform the old text into the new text")]
    Inconsistent,
}

/// A single file's change: old text, new text and the changed sub-ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    old_text: String,
    new_text: String,
    fragments: Vec<Fragment>,
}

impl TextPatch {
    /// Build a patch from explicit fragments.
    ///
    /// Fails if the fragments are unsorted, overlap, touch, exceed the new text, or do not
    /// transform `old_text` into `new_text`.
    pub fn new(
        old_text: impl Into<String>,
        new_text: impl Into<String>,
        fragments: Vec<Fragment>,
    ) -> Result<Self, PatchError> {
        let old_text = old_text.into();
        let new_text = new_text.into();

        let len = char_len(&new_text);
        for (index, fragment) in fragments.iter().enumerate() {
            if fragment.new_end() > len {
                return Err(PatchError::OutOfBounds {
                    index,
                    end: fragment.new_end(),
                    len,
                });
            }
            if index > 0 && fragment.offset <= fragments[index - 1].new_end() {
                return Err(PatchError::Unordered { index });
            }
        }

        let mut rope = Rope::from_str(&old_text);
        apply_fragments(&mut rope, &new_text, &fragments)?;
        if rope != new_text.as_str() {
            return Err(PatchError::Inconsistent);
        }

        Ok(Self {
            old_text,
            new_text,
            fragments,
        })
    }

    /// Build a patch from two texts, describing the change as one fragment between their
    /// common prefix and common suffix.
    pub fn between(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        let old_text = old_text.into();
        let new_text = new_text.into();
        let fragments = diff_fragment(&old_text, &new_text).into_iter().collect();
        Self {
            old_text,
            new_text,
            fragments,
        }
    }

    /// Text before the change.
    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    /// Text after the change.
    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// Changed sub-ranges, sorted by offset.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.old_text == self.new_text
    }

    /// Map an offset in the old text to the new text, fragment by fragment.
    pub fn translate_offset(&self, offset: usize, lean_right: bool) -> usize {
        self.fragments
            .iter()
            .fold(offset, |acc, fragment| fragment.translate_offset(acc, lean_right))
    }

    /// Merge with a patch applied right after this one.
    ///
    /// Returns `None` when `next` was not computed against this patch's new text.
    pub fn merge_with_next(&self, next: &TextPatch) -> Option<TextPatch> {
        if self.new_text != next.old_text {
            return None;
        }
        let fragments = compose(&self.fragments, &next.fragments);
        TextPatch::new(self.old_text.clone(), next.new_text.clone(), fragments).ok()
    }

    /// Apply the fragments to a rope holding the old text.
    pub fn apply_to_rope(&self, rope: &mut Rope) -> Result<(), PatchError> {
        apply_fragments(rope, &self.new_text, &self.fragments)
    }

    /// Apply the fragments to `text`, which should equal the old text.
    pub fn apply_to(&self, text: &str) -> Result<String, PatchError> {
        let mut rope = Rope::from_str(text);
        self.apply_to_rope(&mut rope)?;
        Ok(rope.to_string())
    }

    /// Split into `(old_text, new_text, fragments)`.
    pub fn into_parts(self) -> (String, String, Vec<Fragment>) {
        (self.old_text, self.new_text, self.fragments)
    }
}

fn apply_fragments(rope: &mut Rope, new_text: &str, fragments: &[Fragment]) -> Result<(), PatchError> {
    let source = Rope::from_str(new_text);
    for (index, fragment) in fragments.iter().enumerate() {
        if fragment.old_end() > rope.len_chars() || fragment.new_end() > source.len_chars() {
            return Err(PatchError::RemovedPastEnd { index });
        }
        rope.remove(fragment.offset..fragment.old_end());
        let mut at = fragment.offset;
        for chunk in source.slice(fragment.offset..fragment.new_end()).chunks() {
            rope.insert(at, chunk);
            at += char_len(chunk);
        }
    }
    Ok(())
}

fn diff_fragment(old_text: &str, new_text: &str) -> Option<Fragment> {
    if old_text == new_text {
        return None;
    }
    let old_len = char_len(old_text);
    let new_len = char_len(new_text);
    let prefix = common_prefix(old_text, new_text);
    let suffix = common_suffix(old_text, new_text).min(old_len.min(new_len) - prefix);
    Some(Fragment::new(prefix, old_len - prefix - suffix, new_len - prefix - suffix))
}

/// Compose two fragment lists applied one after the other.
///
/// `first` transforms text A into text B and `second` transforms B into C; the result
/// transforms A into C. Fragments of the two lists that intersect in B's coordinates are fused
/// into one fragment.
pub fn compose(first: &[Fragment], second: &[Fragment]) -> Vec<Fragment> {
    // `second` expressed in B's coordinates: its replaced ranges.
    let mut shift = 0isize;
    let second_in_b: Vec<Fragment> = second
        .iter()
        .map(|fragment| {
            let moved = fragment.shifted(-shift);
            shift += fragment.delta();
            moved
        })
        .collect();

    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut shift_before = 0isize;
    let mut group: Option<Group> = None;
    let (mut i, mut j) = (0, 0);

    while i < first.len() || j < second_in_b.len() {
        let take_first = match (first.get(i), second_in_b.get(j)) {
            (Some(a), Some(b)) => a.offset <= b.offset,
            (Some(_), None) => true,
            _ => false,
        };
        let (start, end, first_delta, second_delta) = if take_first {
            let a = first[i];
            i += 1;
            (a.offset, a.new_end(), a.delta(), 0)
        } else {
            let b = second_in_b[j];
            j += 1;
            (b.offset, b.old_end(), 0, b.delta())
        };

        match group.as_mut() {
            Some(current) if start <= current.end => {
                current.end = current.end.max(end);
                current.first_delta += first_delta;
                current.second_delta += second_delta;
            }
            _ => {
                if let Some(done) = group.take() {
                    out.push(done.finish(&mut shift_before));
                }
                group = Some(Group {
                    start,
                    end,
                    first_delta,
                    second_delta,
                });
            }
        }
    }
    if let Some(done) = group {
        out.push(done.finish(&mut shift_before));
    }
    out.retain(|fragment| fragment.old_length > 0 || fragment.new_length > 0);
    out
}

/// A run of intersecting fragments, in the intermediate text's coordinates.
struct Group {
    start: usize,
    end: usize,
    first_delta: isize,
    second_delta: isize,
}

impl Group {
    fn finish(self, shift_before: &mut isize) -> Fragment {
        let span = self.end - self.start;
        // Each side folded into one fragment covering the whole span.
        let first = Fragment::new(self.start, span.saturating_add_signed(-self.first_delta), span);
        let second = Fragment::new(self.start, span, span.saturating_add_signed(self.second_delta));
        let merged = first.merge_with_next(&second).shifted(*shift_before);
        *shift_before += self.second_delta;
        merged
    }
}

/// Shrink each fragment to the characters that actually differ between `old_text` and
/// `new_text`, dropping fragments that change nothing.
pub(crate) fn tighten(old_text: &str, new_text: &str, fragments: Vec<Fragment>) -> Vec<Fragment> {
    let old = Rope::from_str(old_text);
    let new = Rope::from_str(new_text);
    let mut shift = 0isize;
    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let old_start = fragment.offset.saturating_add_signed(-shift);
        shift += fragment.delta();
        let removed = old.slice(old_start..old_start + fragment.old_length).to_string();
        let inserted = new.slice(fragment.offset..fragment.new_end()).to_string();
        if let Some(inner) = diff_fragment(&removed, &inserted) {
            out.push(Fragment::new(
                fragment.offset + inner.offset,
                inner.old_length,
                inner.new_length,
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_offset_inside_insertion() {
        let patch = TextPatch::new("a{}b", "a{ }b", vec![Fragment::new(2, 0, 1)]).unwrap();
        assert_eq!(patch.translate_offset(2, false), 2);
        assert_eq!(patch.translate_offset(2, true), 3);
        assert_eq!(patch.translate_offset(1, true), 1);
        assert_eq!(patch.translate_offset(3, false), 4);
    }

    #[test]
    fn test_new_rejects_touching_fragments() {
        let err = TextPatch::new(
            "abcd",
            "xbyd",
            vec![Fragment::new(0, 1, 1), Fragment::new(1, 1, 1)],
        )
        .unwrap_err();
        assert_eq!(err, PatchError::Unordered { index: 1 });
    }

    #[test]
    fn test_new_rejects_out_of_bounds() {
        let err = TextPatch::new("ab", "abc", vec![Fragment::new(2, 0, 2)]).unwrap_err();
        assert!(matches!(err, PatchError::OutOfBounds { index: 0, end: 4, len: 3 }));
    }

    #[test]
    fn test_new_rejects_inconsistent_fragments() {
        let err = TextPatch::new("abc", "abd", vec![Fragment::new(0, 1, 1)]).unwrap_err();
        assert_eq!(err, PatchError::Inconsistent);
    }

    #[test]
    fn test_between_uses_common_prefix_and_suffix() {
        let patch = TextPatch::between("foo(bar)", "foo(baz, qux)");
        assert_eq!(patch.fragments(), &[Fragment::new(6, 1, 6)]);
        assert_eq!(patch.apply_to("foo(bar)").unwrap(), "foo(baz, qux)");

        let repeated = TextPatch::between("aaa", "aaaa");
        assert_eq!(repeated.fragments(), &[Fragment::new(3, 0, 1)]);
    }

    #[test]
    fn test_merge_with_next_fragment() {
        // "hello world" -> "hello, world" -> "hello, big world"
        let first = Fragment::new(5, 0, 1);
        let second = Fragment::new(7, 0, 4);
        assert!(!first.intersects(&second));
        assert_eq!(first.merge_with_next(&second), Fragment::new(5, 1, 6));

        let overlapping = Fragment::new(6, 1, 0);
        assert!(first.intersects(&overlapping));
        assert_eq!(first.merge_with_next(&overlapping), Fragment::new(5, 1, 1));
    }

    #[test]
    fn test_merge_patches_keeps_distant_fragments_apart() {
        let first = TextPatch::between("one two three", "one 2 three");
        let second = TextPatch::between("one 2 three", "one 2 3");
        let merged = first.merge_with_next(&second).unwrap();
        assert_eq!(merged.old_text(), "one two three");
        assert_eq!(merged.new_text(), "one 2 3");
        assert_eq!(merged.fragments(), &[Fragment::new(4, 3, 1), Fragment::new(6, 5, 1)]);
    }

    #[test]
    fn test_merge_patches_rejects_unrelated_texts() {
        let first = TextPatch::between("a", "b");
        let second = TextPatch::between("x", "y");
        assert!(first.merge_with_next(&second).is_none());
    }

    #[test]
    fn test_tighten_drops_unchanged_characters() {
        let fragments = tighten("abcdef", "abXdef", vec![Fragment::new(1, 4, 4)]);
        assert_eq!(fragments, vec![Fragment::new(2, 1, 1)]);
        assert!(tighten("abc", "abc", vec![Fragment::new(0, 3, 3)]).is_empty());
    }
}
