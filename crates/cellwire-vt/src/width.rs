//! Display-width measurement.
//!
//! Two policies exist because terminals disagree: legacy hosts advance the
//! cursor per codepoint (`wcwidth`), modern ones measure whole grapheme
//! clusters so emoji and ZWJ sequences occupy the cells they visually fill.
//! Both are needed — the grid must match whatever the attached terminal
//! actually does.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Width measurement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthMethod {
    /// Fixed width per codepoint, wcwidth-style.
    Wcwidth,
    /// Grapheme-cluster segmentation; a cluster is one unit.
    #[default]
    Grapheme,
}

impl WidthMethod {
    /// Display width of a string under this policy.
    pub fn string_width(self, s: &str) -> usize {
        match self {
            WidthMethod::Wcwidth => s.chars().map(char_width).sum(),
            WidthMethod::Grapheme => s.graphemes(true).map(cluster_width).sum(),
        }
    }
}

/// Monospace display width of a single codepoint (0, 1, or 2).
///
/// Control characters measure 0.
#[inline]
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Monospace display width of one grapheme cluster.
///
/// A cluster is wide when any of its codepoints is wide or when an emoji
/// variation selector (U+FE0F) forces emoji presentation; a pair of regional
/// indicators (a flag) is wide. Naively summing codepoint widths would
/// overcount ZWJ sequences, so the cluster is measured as a unit.
pub fn cluster_width(cluster: &str) -> usize {
    let mut chars = cluster.chars();
    let Some(first) = chars.next() else {
        return 0;
    };

    if is_regional_indicator(first) {
        return 2;
    }

    let mut width = char_width(first);
    for c in chars {
        if c == '\u{FE0F}' {
            // Emoji presentation selector upgrades the base to wide.
            width = 2;
        } else {
            let w = char_width(c);
            if w > width {
                width = w;
            }
        }
    }
    width
}

/// Display width of a whole string under the grapheme policy.
///
/// Shorthand for `WidthMethod::Grapheme.string_width(s)`.
#[inline]
pub fn string_width(s: &str) -> usize {
    WidthMethod::Grapheme.string_width(s)
}

#[inline]
fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_one_column() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(cluster_width("a"), 1);
    }

    #[test]
    fn controls_are_zero() {
        assert_eq!(char_width('\x07'), 0);
        assert_eq!(char_width('\u{200B}'), 0);
    }

    #[test]
    fn cjk_is_wide() {
        assert_eq!(char_width('中'), 2);
        assert_eq!(cluster_width("中"), 2);
    }

    #[test]
    fn combining_marks_stay_with_base() {
        // e + combining acute: one cluster, one column.
        assert_eq!(cluster_width("e\u{0301}"), 1);
        assert_eq!(WidthMethod::Grapheme.string_width("e\u{0301}"), 1);
        // Under wcwidth the mark contributes zero, so totals agree here.
        assert_eq!(WidthMethod::Wcwidth.string_width("e\u{0301}"), 1);
    }

    #[test]
    fn emoji_is_wide() {
        assert_eq!(cluster_width("👋"), 2);
        assert_eq!(cluster_width("🎉"), 2);
    }

    #[test]
    fn zwj_sequence_is_one_wide_cluster() {
        // Family: four emoji joined by ZWJ — a single 2-column cluster.
        let family = "👨\u{200D}👩\u{200D}👧\u{200D}👦";
        assert_eq!(cluster_width(family), 2);
        assert_eq!(WidthMethod::Grapheme.string_width(family), 2);
        // wcwidth counts each emoji separately.
        assert_eq!(WidthMethod::Wcwidth.string_width(family), 8);
    }

    #[test]
    fn variation_selector_forces_wide() {
        // U+2764 HEAVY BLACK HEART is narrow; VS16 makes it emoji (wide).
        assert_eq!(cluster_width("\u{2764}\u{FE0F}"), 2);
    }

    #[test]
    fn flags_are_wide() {
        assert_eq!(cluster_width("🇺🇸"), 2);
    }

    #[test]
    fn mixed_string_width() {
        assert_eq!(string_width("a中b"), 4);
        assert_eq!(string_width(""), 0);
    }
}
