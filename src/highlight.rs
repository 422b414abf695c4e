use std::time::{Duration, Instant};

use crate::nav::Reference;

/// How long a verse stays highlighted after a jump.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// Coordinates the jump-to-verse scroll and its transient highlight.
///
/// A `go_to` issued before the chapter's verse list has been fetched and laid
/// out is held, not dropped; the app drains it with `layout_ready` once the
/// list is on screen. Only one target exists at a time: a newer `go_to`
/// replaces both the pending target and any running clear timer, so only the
/// most recent verse ever shows highlighted.
#[derive(Debug, Default)]
pub struct Highlight {
    pending: Option<u32>,
    highlighted: Option<u32>,
    clear_at: Option<Instant>,
}

impl Highlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// The verse number currently highlighted, if any.
    pub fn highlighted(&self) -> Option<u32> {
        self.highlighted
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Aim at a reference. Without a verse there is nothing to highlight and
    /// any prior target or highlight is dropped.
    pub fn go_to(&mut self, reference: Reference) {
        self.highlighted = None;
        self.clear_at = None;
        self.pending = reference.verse;
    }

    /// The verse list is fetched and laid out; resolve the pending target.
    /// Returns the zero-based index the view should scroll to the top, and
    /// starts the clear timer. Verse numbers past the end of the list clamp
    /// to the last verse.
    pub fn layout_ready(&mut self, verse_count: usize, now: Instant) -> Option<usize> {
        let verse = self.pending.take()?;
        if verse_count == 0 {
            return None;
        }
        let index = (verse.max(1) as usize - 1).min(verse_count - 1);
        self.highlighted = Some(index as u32 + 1);
        self.clear_at = Some(now + HIGHLIGHT_DURATION);
        Some(index)
    }

    /// Clear the highlight once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.clear_at.is_some_and(|deadline| now >= deadline) {
            self.highlighted = None;
            self.clear_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse_ref(verse: u32) -> Reference {
        Reference { book: 43, chapter: 3, verse: Some(verse) }
    }

    #[test]
    fn test_scrolls_to_zero_based_index_and_highlights() {
        let mut hl = Highlight::new();
        hl.go_to(verse_ref(16));
        let now = Instant::now();
        assert_eq!(hl.layout_ready(36, now), Some(15));
        assert_eq!(hl.highlighted(), Some(16));
    }

    #[test]
    fn test_no_verse_means_no_scroll_or_highlight() {
        let mut hl = Highlight::new();
        hl.go_to(Reference::chapter_of(19, 119));
        assert!(!hl.has_pending());
        assert_eq!(hl.layout_ready(176, Instant::now()), None);
        assert_eq!(hl.highlighted(), None);
    }

    #[test]
    fn test_target_deferred_until_layout_ready() {
        let mut hl = Highlight::new();
        hl.go_to(verse_ref(5));
        assert!(hl.has_pending());
        assert_eq!(hl.highlighted(), None);
        assert_eq!(hl.layout_ready(10, Instant::now()), Some(4));
        assert!(!hl.has_pending());
    }

    #[test]
    fn test_auto_clears_after_duration() {
        let mut hl = Highlight::new();
        let now = Instant::now();
        hl.go_to(verse_ref(3));
        hl.layout_ready(10, now);

        hl.tick(now + Duration::from_millis(1999));
        assert_eq!(hl.highlighted(), Some(3));

        hl.tick(now + HIGHLIGHT_DURATION);
        assert_eq!(hl.highlighted(), None);
    }

    #[test]
    fn test_go_to_is_idempotent() {
        let mut hl = Highlight::new();
        let now = Instant::now();
        hl.go_to(verse_ref(16));
        let first = hl.layout_ready(36, now);
        hl.go_to(verse_ref(16));
        let second = hl.layout_ready(36, now);
        assert_eq!(first, second);
        assert_eq!(hl.highlighted(), Some(16));
    }

    #[test]
    fn test_new_target_cancels_prior_clear_timer() {
        let mut hl = Highlight::new();
        let start = Instant::now();
        hl.go_to(verse_ref(3));
        hl.layout_ready(10, start);

        // Retarget just before the first highlight would have cleared.
        let retarget = start + Duration::from_millis(1900);
        hl.go_to(verse_ref(7));
        hl.layout_ready(10, retarget);

        hl.tick(start + HIGHLIGHT_DURATION);
        assert_eq!(hl.highlighted(), Some(7));

        hl.tick(retarget + HIGHLIGHT_DURATION);
        assert_eq!(hl.highlighted(), None);
    }

    #[test]
    fn test_out_of_range_verse_clamps_to_last() {
        let mut hl = Highlight::new();
        hl.go_to(verse_ref(40));
        assert_eq!(hl.layout_ready(36, Instant::now()), Some(35));
        assert_eq!(hl.highlighted(), Some(36));
    }

    #[test]
    fn test_empty_list_drops_target() {
        let mut hl = Highlight::new();
        hl.go_to(verse_ref(1));
        assert_eq!(hl.layout_ready(0, Instant::now()), None);
        assert_eq!(hl.highlighted(), None);
        assert!(!hl.has_pending());
    }
}
