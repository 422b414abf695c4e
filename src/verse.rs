use serde::{Deserialize, Serialize};

/// Paragraph marker embedded in KJV verse text. Stripped on display.
pub const PARAGRAPH_MARK: char = '¶';

/// One verse as stored in the corpus. Immutable once fetched; the reader
/// swaps whole chapters of these, never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub id: i64,
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// A run of verse text with a single rendering style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Translator-supplied words, bracketed in the source text. Rendered
    /// italic, brackets removed.
    pub supplied: bool,
}

impl Verse {
    /// Plain display text: paragraph marks stripped, brackets removed.
    pub fn display_text(&self) -> String {
        self.segments()
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    /// Split the raw text into styled runs. `[...]` spans become supplied
    /// segments without the brackets; an unmatched `[` is kept literally.
    pub fn segments(&self) -> Vec<Segment> {
        let cleaned: String = self.text.chars().filter(|&c| c != PARAGRAPH_MARK).collect();
        let mut segments = Vec::new();
        let mut rest = cleaned.as_str();

        while let Some(open) = rest.find('[') {
            match rest[open..].find(']') {
                Some(rel_close) => {
                    let close = open + rel_close;
                    if open > 0 {
                        segments.push(Segment {
                            text: rest[..open].to_string(),
                            supplied: false,
                        });
                    }
                    segments.push(Segment {
                        text: rest[open + 1..close].to_string(),
                        supplied: true,
                    });
                    rest = &rest[close + 1..];
                }
                None => break,
            }
        }

        if !rest.is_empty() {
            segments.push(Segment {
                text: rest.to_string(),
                supplied: false,
            });
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(text: &str) -> Verse {
        Verse {
            id: 1,
            book: 1,
            chapter: 1,
            verse: 1,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_plain_text_single_segment() {
        let v = verse("In the beginning God created the heaven and the earth.");
        let segs = v.segments();
        assert_eq!(segs.len(), 1);
        assert!(!segs[0].supplied);
        assert_eq!(v.display_text(), v.text);
    }

    #[test]
    fn test_paragraph_mark_stripped() {
        let v = verse("¶ And God said, Let there be light:");
        assert_eq!(v.display_text(), " And God said, Let there be light:");
    }

    #[test]
    fn test_bracketed_span_becomes_supplied() {
        let v = verse("and darkness [was] upon the face of the deep.");
        let segs = v.segments();
        assert_eq!(
            segs,
            vec![
                Segment { text: "and darkness ".into(), supplied: false },
                Segment { text: "was".into(), supplied: true },
                Segment { text: " upon the face of the deep.".into(), supplied: false },
            ]
        );
        assert_eq!(v.display_text(), "and darkness was upon the face of the deep.");
    }

    #[test]
    fn test_multiple_bracketed_spans() {
        let v = verse("[one] and [two]");
        let supplied: Vec<String> = v
            .segments()
            .into_iter()
            .filter(|s| s.supplied)
            .map(|s| s.text)
            .collect();
        assert_eq!(supplied, vec!["one", "two"]);
    }

    #[test]
    fn test_unmatched_bracket_kept_literal() {
        let v = verse("broken [span");
        let segs = v.segments();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].text, "broken [span");
        assert!(!segs[0].supplied);
    }

    #[test]
    fn test_empty_text() {
        assert!(verse("").segments().is_empty());
    }
}
