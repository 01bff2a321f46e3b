/*!
 * Cross-batch sentence boundary stitching.
 *
 * A fixed page range can cut the text mid-sentence. Before segmentation,
 * the trailing text of a batch is extended to a sentence boundary using a
 * bounded preview of the next batch; the borrowed length never exceeds the
 * configured cap.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters accepted as sentence-terminal punctuation.
pub const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?', '\u{201d}', '\u{2019}', ')', ']'];

static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Extends batch text to a sentence boundary within a borrow bound.
pub struct Stitcher {
    /// Maximum characters borrowed from the next batch's preview
    max_borrow: usize,
}

impl Stitcher {
    /// Create a stitcher with the given borrow cap.
    pub fn new(max_borrow: usize) -> Self {
        Self { max_borrow }
    }

    /// Extend `current` to a sentence boundary using a preview of the next
    /// batch's raw text.
    ///
    /// 1. Text already ending in terminal punctuation is returned unchanged.
    /// 2. Otherwise, everything up to (excluding) the first paragraph
    ///    boundary in the capped preview is appended.
    /// 3. Otherwise, everything up to and including the first terminal
    ///    punctuation character is appended.
    /// 4. Otherwise the whole capped preview is appended as best effort.
    pub fn stitch(&self, current: &str, next_preview: &str) -> String {
        let trimmed = current.trim_end();
        if trimmed.is_empty() || trimmed.ends_with(TERMINAL_PUNCTUATION) {
            return current.to_string();
        }

        let preview = Self::cap_chars(next_preview, self.max_borrow);
        if preview.is_empty() {
            return current.to_string();
        }

        if let Some(paragraph_break) = PARAGRAPH_BREAK_REGEX.find(preview) {
            return format!("{current}{}", &preview[..paragraph_break.start()]);
        }

        for (offset, ch) in preview.char_indices() {
            if TERMINAL_PUNCTUATION.contains(&ch) {
                let end = offset + ch.len_utf8();
                return format!("{current}{}", &preview[..end]);
            }
        }

        format!("{current}{preview}")
    }

    /// Char-boundary-safe prefix of at most `max_chars` characters.
    fn cap_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((offset, _)) => &text[..offset],
            None => text,
        }
    }
}
