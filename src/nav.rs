use crate::catalog::BookId;

/// A location in the corpus. `verse` is absent for whole-chapter navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub book: BookId,
    pub chapter: u32,
    pub verse: Option<u32>,
}

impl Reference {
    pub fn chapter_of(book: BookId, chapter: u32) -> Self {
        Self { book, chapter, verse: None }
    }
}

/// Which column of the drill-down the picker is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillStep {
    Book,
    Chapter,
    Verse,
}

/// A bounds query the state machine wants answered. The generation token
/// ties the eventual response to the selection that issued it; a response
/// whose token no longer matches is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsQuery {
    MaxChapter { book: BookId, generation: u64 },
    MaxVerse { book: BookId, chapter: u32, generation: u64 },
}

impl BoundsQuery {
    pub fn generation(&self) -> u64 {
        match *self {
            BoundsQuery::MaxChapter { generation, .. } => generation,
            BoundsQuery::MaxVerse { generation, .. } => generation,
        }
    }
}

/// The three-step drill-down Book → Chapter → Verse, plus the implicit
/// closed state. Selecting deeper issues bounds queries; the step only
/// advances once the matching response arrives, so a selection change with
/// a query still in flight simply orphans the old response.
#[derive(Debug)]
pub struct Drill {
    open: bool,
    step: DrillStep,
    pub query: String,
    book: Option<BookId>,
    chapter: Option<u32>,
    max_chapter: Option<u32>,
    max_verse: Option<u32>,
    generation: u64,
}

impl Drill {
    pub fn new() -> Self {
        Self {
            open: false,
            step: DrillStep::Book,
            query: String::new(),
            book: None,
            chapter: None,
            max_chapter: None,
            max_verse: None,
            generation: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> DrillStep {
        self.step
    }

    pub fn book(&self) -> Option<BookId> {
        self.book
    }

    pub fn chapter(&self) -> Option<u32> {
        self.chapter
    }

    pub fn max_chapter(&self) -> Option<u32> {
        self.max_chapter
    }

    pub fn max_verse(&self) -> Option<u32> {
        self.max_verse
    }

    /// Count of numbers shown by the grid for the current step.
    pub fn grid_len(&self) -> u32 {
        match self.step {
            DrillStep::Book => 0,
            DrillStep::Chapter => self.max_chapter.unwrap_or(0),
            DrillStep::Verse => self.max_verse.unwrap_or(0),
        }
    }

    /// Open the picker at the book step with a fresh query.
    pub fn open(&mut self) {
        self.reset();
        self.open = true;
    }

    /// Dismiss without committing. Outstanding queries lose interest.
    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.open = false;
        self.step = DrillStep::Book;
        self.query.clear();
        self.book = None;
        self.chapter = None;
        self.max_chapter = None;
        self.max_verse = None;
        self.generation += 1;
    }

    /// Select a book. The step advances to Chapter once the returned query's
    /// response arrives via [`bounds_ready`](Self::bounds_ready).
    pub fn pick_book(&mut self, book: BookId) -> Option<BoundsQuery> {
        if !self.open || self.step != DrillStep::Book {
            return None;
        }
        self.book = Some(book);
        self.generation += 1;
        Some(BoundsQuery::MaxChapter { book, generation: self.generation })
    }

    /// Select a chapter candidate at the chapter step, heading for a verse
    /// pick. Use [`commit_chapter`](Self::commit_chapter) instead to finish
    /// with a whole-chapter reference.
    pub fn pick_chapter(&mut self, chapter: u32) -> Option<BoundsQuery> {
        if !self.open || self.step != DrillStep::Chapter {
            return None;
        }
        let book = self.book?;
        self.chapter = Some(chapter);
        self.generation += 1;
        Some(BoundsQuery::MaxVerse { book, chapter, generation: self.generation })
    }

    /// Apply a bounds response. Returns false when the response is stale
    /// (the selection that issued it has been superseded).
    pub fn bounds_ready(&mut self, query: BoundsQuery, bound: u32) -> bool {
        if query.generation() != self.generation {
            return false;
        }
        match query {
            BoundsQuery::MaxChapter { .. } => {
                self.max_chapter = Some(bound.max(1));
                self.step = DrillStep::Chapter;
            }
            BoundsQuery::MaxVerse { .. } => {
                self.max_verse = Some(bound.max(1));
                self.step = DrillStep::Verse;
            }
        }
        true
    }

    /// Commit a whole chapter from the chapter step.
    pub fn commit_chapter(&mut self, chapter: u32) -> Option<Reference> {
        if !self.open || self.step != DrillStep::Chapter {
            return None;
        }
        let book = self.book?;
        self.reset();
        Some(Reference { book, chapter, verse: None })
    }

    /// Commit a verse from the verse step.
    pub fn commit_verse(&mut self, verse: u32) -> Option<Reference> {
        if !self.open || self.step != DrillStep::Verse {
            return None;
        }
        let (book, chapter) = (self.book?, self.chapter?);
        self.reset();
        Some(Reference { book, chapter, verse: Some(verse) })
    }

    /// Step back one level, discarding the deeper selection. Bounds for the
    /// level returned to are kept; the corpus is immutable, so they stay
    /// valid and are not re-queried. Returns false at the book step, where
    /// back means cancel and the caller should close instead.
    pub fn back(&mut self) -> bool {
        match self.step {
            DrillStep::Book => false,
            DrillStep::Chapter => {
                self.step = DrillStep::Book;
                self.book = None;
                self.max_chapter = None;
                self.generation += 1;
                true
            }
            DrillStep::Verse => {
                self.step = DrillStep::Chapter;
                self.chapter = None;
                self.max_verse = None;
                self.generation += 1;
                true
            }
        }
    }
}

impl Default for Drill {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drilled_to_chapter(book: BookId, max_chapter: u32) -> Drill {
        let mut drill = Drill::new();
        drill.open();
        let query = drill.pick_book(book).unwrap();
        assert!(drill.bounds_ready(query, max_chapter));
        drill
    }

    #[test]
    fn test_open_resets_to_book_step_with_empty_query() {
        let mut drill = Drill::new();
        drill.open();
        drill.query.push_str("psa");
        drill.close();
        drill.open();
        assert_eq!(drill.step(), DrillStep::Book);
        assert!(drill.query.is_empty());
    }

    #[test]
    fn test_pick_book_advances_only_when_bounds_arrive() {
        let mut drill = Drill::new();
        drill.open();
        let query = drill.pick_book(19).unwrap();
        assert_eq!(drill.step(), DrillStep::Book);
        assert!(drill.bounds_ready(query, 150));
        assert_eq!(drill.step(), DrillStep::Chapter);
        assert_eq!(drill.max_chapter(), Some(150));
    }

    #[test]
    fn test_stale_bounds_response_discarded() {
        let mut drill = Drill::new();
        drill.open();
        let stale = drill.pick_book(19).unwrap();
        let fresh = drill.pick_book(1).unwrap();
        assert!(!drill.bounds_ready(stale, 150));
        assert_eq!(drill.step(), DrillStep::Book);
        assert!(drill.bounds_ready(fresh, 50));
        assert_eq!(drill.book(), Some(1));
        assert_eq!(drill.max_chapter(), Some(50));
    }

    #[test]
    fn test_bounds_response_after_close_discarded() {
        let mut drill = Drill::new();
        drill.open();
        let query = drill.pick_book(19).unwrap();
        drill.close();
        assert!(!drill.bounds_ready(query, 150));
    }

    #[test]
    fn test_whole_chapter_commit() {
        let mut drill = drilled_to_chapter(19, 150);
        let reference = drill.commit_chapter(119).unwrap();
        assert_eq!(reference, Reference { book: 19, chapter: 119, verse: None });
        assert!(!drill.is_open());
        assert_eq!(drill.step(), DrillStep::Book);
    }

    #[test]
    fn test_verse_commit() {
        let mut drill = drilled_to_chapter(43, 21);
        let query = drill.pick_chapter(3).unwrap();
        assert!(drill.bounds_ready(query, 36));
        assert_eq!(drill.step(), DrillStep::Verse);
        let reference = drill.commit_verse(16).unwrap();
        assert_eq!(reference, Reference { book: 43, chapter: 3, verse: Some(16) });
        assert!(!drill.is_open());
    }

    #[test]
    fn test_back_from_chapter_discards_book_and_bounds() {
        let mut drill = drilled_to_chapter(19, 150);
        drill.query.clear();
        assert!(drill.back());
        assert_eq!(drill.step(), DrillStep::Book);
        assert_eq!(drill.book(), None);
        assert_eq!(drill.max_chapter(), None);
        assert!(drill.query.is_empty());
    }

    #[test]
    fn test_back_from_verse_keeps_chapter_bounds() {
        let mut drill = drilled_to_chapter(43, 21);
        let query = drill.pick_chapter(3).unwrap();
        drill.bounds_ready(query, 36);
        assert!(drill.back());
        assert_eq!(drill.step(), DrillStep::Chapter);
        assert_eq!(drill.max_chapter(), Some(21));
        assert_eq!(drill.chapter(), None);
        assert_eq!(drill.max_verse(), None);
    }

    #[test]
    fn test_back_at_book_step_is_cancel() {
        let mut drill = Drill::new();
        drill.open();
        assert!(!drill.back());
    }

    #[test]
    fn test_bounds_of_zero_degrade_to_one() {
        let mut drill = Drill::new();
        drill.open();
        let query = drill.pick_book(5).unwrap();
        drill.bounds_ready(query, 0);
        assert_eq!(drill.max_chapter(), Some(1));
    }

    #[test]
    fn test_pick_out_of_step_is_ignored() {
        let mut drill = Drill::new();
        assert!(drill.pick_book(1).is_none());
        drill.open();
        assert!(drill.pick_chapter(1).is_none());
        assert!(drill.commit_verse(1).is_none());
    }
}
