/*!
 * Segmentation and the index tag grammar.
 *
 * A batch's raw text is split on runs of blank lines into trimmed,
 * non-empty units with sequential 1-based indices. Each unit travels to
 * the oracle wrapped in an index-carrying delimiter:
 *
 * ```text
 * unit    := "<s" INDEX ">" CONTENT "</s" INDEX ">"
 * INDEX   := positive decimal integer
 * CONTENT := any text without a closing delimiter
 * ```
 *
 * Units are joined with one blank line. `decode` scans free-form oracle
 * output and returns all units in order of appearance, tolerating any
 * surrounding prose; the index is read from the opening delimiter and
 * round-trips unmodified.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder the oracle emits for a unit it could not translate.
pub const MISSING_MARKER: &str = "{{MISSING}}";

/// Marker the oracle emits for headers, footers, page numbers and other
/// non-prose matter.
pub const BOILERPLATE_MARKER: &str = "{{BOILERPLATE}}";

/// Separator between rendered units in cleaned output.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

// Unit delimiter pattern. Dot-all so unit content may span lines.
static UNIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<s(\d+)>(.*?)</s\d+>").unwrap());

// Blank-line run between paragraphs.
static PARAGRAPH_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Wrap one unit of content in its index delimiter.
pub fn encode(index: usize, content: &str) -> String {
    format!("<s{index}>{content}</s{index}>")
}

/// Extract all delimited units from free-form text, in order of
/// appearance, as `(index, trimmed content)` pairs.
pub fn decode(text: &str) -> Vec<(usize, String)> {
    UNIT_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let index: usize = caps.get(1)?.as_str().parse().ok()?;
            let content = caps.get(2)?.as_str().trim().to_string();
            Some((index, content))
        })
        .collect()
}

/// Processing state of a single segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStatus {
    /// Created, not yet reconciled against oracle output
    Pending,
    /// The oracle produced a translation for it
    Rendered,
    /// Explicitly or implicitly absent from the oracle output
    Missing,
    /// Classified as boilerplate and excluded from prose
    Suppressed,
}

/// One atomic, indexed unit of source text within a batch.
#[derive(Debug, Clone)]
pub struct Segment {
    /// 1-based index, contiguous and unique within the batch
    pub index: usize,

    /// Source text of the unit
    pub raw_text: String,

    /// Translated text, once rendered
    pub rendered_text: Option<String>,

    /// Reconciliation status
    pub status: SegmentStatus,
}

/// Splits raw batch text into ordered, uniquely indexed segments.
pub struct Segmenter;

impl Segmenter {
    /// Split raw text on blank-line runs into trimmed, non-empty segments
    /// with sequential 1-based indices.
    pub fn segment(raw_text: &str) -> Vec<Segment> {
        PARAGRAPH_BREAK_REGEX
            .split(raw_text)
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .enumerate()
            .map(|(position, unit)| Segment {
                index: position + 1,
                raw_text: unit.to_string(),
                rendered_text: None,
                status: SegmentStatus::Pending,
            })
            .collect()
    }

    /// Tagged payload for the oracle: every segment encoded and joined
    /// with blank lines.
    pub fn tagged_payload(segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|segment| encode(segment.index, &segment.raw_text))
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }
}
