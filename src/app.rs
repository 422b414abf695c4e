use std::time::Instant;

use anyhow::Result;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::{self, BookId};
use crate::highlight::Highlight;
use crate::nav::{BoundsQuery, Drill, DrillStep, Reference};
use crate::store::VerseStore;
use crate::tui::AppEvent;
use crate::verse::Verse;

/// Columns in the chapter/verse number grid.
pub const GRID_COLS: usize = 10;

/// The text a verse occupies in the reader, verse-number prefix included,
/// for line estimates.
pub fn rendered_verse_text(verse: &Verse) -> String {
    format!("{} {}", verse.verse, verse.display_text())
}

/// Lines `text` occupies at `width`, under the greedy word wrapping the
/// renderer uses: break before a word that would overflow, spill words wider
/// than the viewport across lines. Empty text still takes one line.
pub fn wrapped_line_count(text: &str, width: usize) -> u16 {
    if width == 0 {
        return 1;
    }
    let mut lines = 1u16;
    let mut col = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        let needed = if col == 0 { len } else { len + 1 };
        if col + needed <= width {
            col += needed;
        } else if len <= width {
            lines += 1;
            col = len;
        } else {
            if col > 0 {
                lines += 1;
            }
            lines += ((len - 1) / width) as u16;
            col = (len - 1) % width + 1;
        }
    }
    lines
}

/// Completed store query, delivered on the main event channel. Each carries
/// the generation token of the selection that issued it.
#[derive(Debug)]
pub enum StoreEvent {
    /// Max-chapter or max-verse answer for the picker.
    PickerBounds {
        query: BoundsQuery,
        result: Result<u32>,
    },
    /// Chapter load for the reader: its chapter bound plus the verse list.
    ChapterLoaded {
        generation: u64,
        result: Result<(u32, Vec<Verse>)>,
    },
}

/// Whether the reader has a chapter on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

pub struct App {
    pub should_quit: bool,

    // Reading position. `verses` is replaced wholesale on every chapter
    // change, never mutated in place.
    pub reference: Reference,
    pub verses: Vec<Verse>,
    pub max_chapter: u32,
    pub load_state: LoadState,
    load_generation: u64,

    // Content viewport, updated during render.
    pub content_scroll: u16,
    pub content_height: u16,
    pub content_width: u16,
    pub total_content_lines: u16,

    // Drill-down picker.
    pub drill: Drill,
    pub book_list_state: ListState,
    pub grid_index: usize,
    pub picker_error: Option<String>,

    pub highlight: Highlight,
    pub translation: Option<String>,

    store: VerseStore,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub async fn new(store: VerseStore, events: UnboundedSender<AppEvent>) -> Result<Self> {
        let translation = store.translation_shortname().await?;

        let mut app = Self {
            should_quit: false,
            reference: Reference::chapter_of(1, 1),
            verses: Vec::new(),
            max_chapter: 1,
            load_state: LoadState::Loading,
            load_generation: 0,
            content_scroll: 0,
            content_height: 0,
            content_width: 0,
            total_content_lines: 0,
            drill: Drill::new(),
            book_list_state: ListState::default(),
            grid_index: 0,
            picker_error: None,
            highlight: Highlight::new(),
            translation,
            store,
            events,
        };
        // Genesis 1 on first launch.
        app.navigate_to(Reference::chapter_of(1, 1));
        Ok(app)
    }

    /// Make `reference` the current reading position and load its chapter.
    /// Any chapter load still in flight for a previous position is orphaned
    /// by the generation bump.
    pub fn navigate_to(&mut self, reference: Reference) {
        self.reference = reference;
        self.load_state = LoadState::Loading;
        self.load_generation += 1;
        self.highlight.go_to(reference);

        let store = self.store.clone();
        let events = self.events.clone();
        let generation = self.load_generation;
        tokio::spawn(async move {
            let result = async {
                let max_chapter = store.max_chapter(reference.book).await?;
                let verses = store.fetch_chapter(reference.book, reference.chapter).await?;
                Ok((max_chapter, verses))
            }
            .await;
            let _ = events.send(AppEvent::Store(StoreEvent::ChapterLoaded { generation, result }));
        });
    }

    pub fn on_store_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::ChapterLoaded { generation, result } => {
                if generation != self.load_generation {
                    log::debug!("discarding stale chapter load (generation {generation})");
                    return;
                }
                match result {
                    Ok((max_chapter, verses)) => {
                        self.max_chapter = max_chapter;
                        self.verses = verses;
                        self.content_scroll = 0;
                        self.load_state = LoadState::Ready;
                    }
                    Err(err) => {
                        log::error!("chapter load failed: {err:#}");
                        self.verses = Vec::new();
                        self.load_state = LoadState::Failed(format!("{err:#}"));
                    }
                }
            }
            StoreEvent::PickerBounds { query, result } => {
                if !self.drill.is_open() {
                    return;
                }
                match result {
                    Ok(bound) => {
                        if self.drill.bounds_ready(query, bound) {
                            self.grid_index = 0;
                        } else {
                            log::debug!("discarding stale bounds response for {query:?}");
                        }
                    }
                    Err(err) => {
                        log::error!("bounds query failed: {err:#}");
                        self.picker_error = Some(format!("{err:#}"));
                    }
                }
            }
        }
    }

    /// Resolve a deferred jump-to-verse once the chapter is loaded and the
    /// viewport has been laid out at least once.
    pub fn apply_pending_highlight(&mut self, now: Instant) {
        if !self.highlight.has_pending()
            || self.load_state != LoadState::Ready
            || self.content_width == 0
        {
            return;
        }
        if let Some(index) = self.highlight.layout_ready(self.verses.len(), now) {
            self.content_scroll = self.verse_line_offset(index);
        }
    }

    /// Line at which verse `index` starts in the rendered content, using the
    /// same wrap estimate as the renderer: one blank line between verses.
    fn verse_line_offset(&self, index: usize) -> u16 {
        let wrap_width = self.content_width.max(1) as usize;
        self.verses
            .iter()
            .take(index)
            .map(|v| wrapped_line_count(&rendered_verse_text(v), wrap_width) + 1)
            .sum()
    }

    // Chapter paging, clamped to [1, max_chapter].

    pub fn next_chapter(&mut self) {
        if self.reference.chapter < self.max_chapter {
            self.navigate_to(Reference::chapter_of(
                self.reference.book,
                self.reference.chapter + 1,
            ));
        }
    }

    pub fn prev_chapter(&mut self) {
        if self.reference.chapter > 1 {
            self.navigate_to(Reference::chapter_of(
                self.reference.book,
                self.reference.chapter - 1,
            ));
        }
    }

    // Content scrolling.

    pub fn scroll_down(&mut self) {
        let max_scroll = self.total_content_lines.saturating_sub(self.content_height);
        if self.content_scroll < max_scroll {
            self.content_scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = self.content_height / 2;
        let max_scroll = self.total_content_lines.saturating_sub(self.content_height);
        self.content_scroll = (self.content_scroll + half).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(self.content_height / 2);
    }

    // Picker.

    pub fn open_picker(&mut self) {
        self.drill.open();
        self.picker_error = None;
        self.book_list_state.select(Some(0));
        self.grid_index = 0;
    }

    pub fn close_picker(&mut self) {
        self.drill.close();
        self.picker_error = None;
    }

    pub fn filtered_books(&self) -> Vec<(BookId, &'static str)> {
        catalog::filter(&self.drill.query)
    }

    pub fn picker_query_push(&mut self, c: char) {
        self.drill.query.push(c);
        self.book_list_state.select(Some(0));
    }

    pub fn picker_query_pop(&mut self) {
        self.drill.query.pop();
        self.book_list_state.select(Some(0));
    }

    pub fn book_list_down(&mut self) {
        let len = self.filtered_books().len();
        if len > 0 {
            let i = self.book_list_state.selected().unwrap_or(0);
            self.book_list_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn book_list_up(&mut self) {
        let i = self.book_list_state.selected().unwrap_or(0);
        self.book_list_state.select(Some(i.saturating_sub(1)));
    }

    /// Move the grid cursor by a signed offset, clamped to the grid.
    pub fn grid_move(&mut self, delta: isize) {
        let len = self.drill.grid_len() as usize;
        if len == 0 {
            return;
        }
        let target = self.grid_index as isize + delta;
        self.grid_index = target.clamp(0, len as isize - 1) as usize;
    }

    /// Enter on the current picker selection: selects a book or chapter
    /// (issuing the bounds query for the next step) or commits a verse.
    pub fn picker_enter(&mut self) {
        self.picker_error = None;
        match self.drill.step() {
            DrillStep::Book => {
                let selected = self
                    .book_list_state
                    .selected()
                    .and_then(|i| self.filtered_books().get(i).copied());
                if let Some((book, _)) = selected {
                    if let Some(query) = self.drill.pick_book(book) {
                        self.spawn_bounds_query(query);
                    }
                }
            }
            DrillStep::Chapter => {
                let chapter = self.grid_index as u32 + 1;
                if let Some(query) = self.drill.pick_chapter(chapter) {
                    self.spawn_bounds_query(query);
                }
            }
            DrillStep::Verse => {
                let verse = self.grid_index as u32 + 1;
                if let Some(reference) = self.drill.commit_verse(verse) {
                    self.navigate_to(reference);
                }
            }
        }
    }

    /// Commit the whole chapter under the grid cursor, skipping the verse
    /// step entirely.
    pub fn picker_commit_chapter(&mut self) {
        if self.drill.step() == DrillStep::Chapter {
            let chapter = self.grid_index as u32 + 1;
            if let Some(reference) = self.drill.commit_chapter(chapter) {
                self.navigate_to(reference);
            }
        }
    }

    /// Back one drill level, or cancel from the book step.
    pub fn picker_back(&mut self) {
        self.picker_error = None;
        if self.drill.back() {
            self.grid_index = 0;
        } else {
            self.close_picker();
        }
    }

    fn spawn_bounds_query(&self, query: BoundsQuery) {
        let store = self.store.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = match query {
                BoundsQuery::MaxChapter { book, .. } => store.max_chapter(book).await,
                BoundsQuery::MaxVerse { book, chapter, .. } => store.max_verse(book, chapter).await,
            };
            let _ = events.send(AppEvent::Store(StoreEvent::PickerBounds { query, result }));
        });
    }

    // Titles.

    pub fn reader_title(&self) -> String {
        let book = catalog::name(self.reference.book).unwrap_or("?");
        format!("{} {}: 1-{}", book, self.reference.chapter, self.verses.len())
    }

    pub fn picker_title(&self) -> String {
        match self.drill.step() {
            DrillStep::Book => "Books".to_string(),
            DrillStep::Chapter => self
                .drill
                .book()
                .and_then(|b| catalog::name(b).ok())
                .unwrap_or("?")
                .to_string(),
            DrillStep::Verse => {
                let book = self
                    .drill
                    .book()
                    .and_then(|b| catalog::name(b).ok())
                    .unwrap_or("?");
                format!("{} {}", book, self.drill.chapter().unwrap_or(0))
            }
        }
    }
}
