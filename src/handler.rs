use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, GRID_COLS};
use crate::nav::DrillStep;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.highlight.tick(Instant::now()),
        AppEvent::Store(store_event) => app.on_store_event(store_event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl-C quits from anywhere.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.drill.is_open() {
        handle_picker_key(app, key);
    } else {
        handle_reader_key(app, key);
    }
}

fn handle_reader_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Content scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('d') => app.scroll_half_page_down(),
        KeyCode::Char('u') => app.scroll_half_page_up(),
        KeyCode::Char('g') => app.content_scroll = 0,

        // Chapter paging
        KeyCode::Char('h') | KeyCode::Left => app.prev_chapter(),
        KeyCode::Char('l') | KeyCode::Right => app.next_chapter(),

        // Open the drill-down picker
        KeyCode::Char('/') | KeyCode::Char('s') => app.open_picker(),

        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    // Esc dismisses the picker from any step without committing.
    if key.code == KeyCode::Esc {
        app.close_picker();
        return;
    }

    match app.drill.step() {
        DrillStep::Book => handle_book_step_key(app, key),
        DrillStep::Chapter | DrillStep::Verse => handle_grid_step_key(app, key),
    }
}

/// Book step: the search field captures printable characters, so list
/// movement is arrows-only here.
fn handle_book_step_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down => app.book_list_down(),
        KeyCode::Up => app.book_list_up(),
        KeyCode::Enter => app.picker_enter(),
        KeyCode::Backspace => {
            if app.drill.query.is_empty() {
                app.picker_back();
            } else {
                app.picker_query_pop();
            }
        }
        KeyCode::Char(c) => app.picker_query_push(c),
        _ => {}
    }
}

fn handle_grid_step_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.grid_move(-1),
        KeyCode::Char('l') | KeyCode::Right => app.grid_move(1),
        KeyCode::Char('j') | KeyCode::Down => app.grid_move(GRID_COLS as isize),
        KeyCode::Char('k') | KeyCode::Up => app.grid_move(-(GRID_COLS as isize)),
        KeyCode::Enter => app.picker_enter(),
        // Whole-chapter commit: read the selected chapter from the top,
        // no verse attached.
        KeyCode::Char('o') => app.picker_commit_chapter(),
        KeyCode::Backspace => app.picker_back(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Reference;
    use crate::store::VerseStore;
    use rusqlite::Connection;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn fixture_app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE verses (id INTEGER PRIMARY KEY, book INTEGER, chapter INTEGER, verse INTEGER, text TEXT);
             CREATE TABLE meta (field TEXT, value TEXT);
             INSERT INTO verses (book, chapter, verse, text) VALUES (1, 1, 1, 'In the beginning');",
        )
        .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(VerseStore::from_connection(conn), tx).await.unwrap()
    }

    #[tokio::test]
    async fn test_q_quits_reader() {
        let mut app = fixture_app().await;
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_slash_opens_picker_and_esc_cancels() {
        let mut app = fixture_app().await;
        let position = app.reference;

        handle_event(&mut app, key(KeyCode::Char('/'))).unwrap();
        assert!(app.drill.is_open());
        assert_eq!(app.drill.step(), DrillStep::Book);

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(!app.drill.is_open());
        // Cancelling leaves the reading position unchanged.
        assert_eq!(app.reference, position);
    }

    #[tokio::test]
    async fn test_typing_at_book_step_filters() {
        let mut app = fixture_app().await;
        handle_event(&mut app, key(KeyCode::Char('/'))).unwrap();
        for c in "1john".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(app.drill.query, "1john");
        assert_eq!(app.filtered_books(), vec![(62, "1 John")]);
    }

    #[tokio::test]
    async fn test_backspace_edits_query_then_cancels() {
        let mut app = fixture_app().await;
        handle_event(&mut app, key(KeyCode::Char('/'))).unwrap();
        handle_event(&mut app, key(KeyCode::Char('a'))).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert!(app.drill.is_open());
        assert!(app.drill.query.is_empty());
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert!(!app.drill.is_open());
    }

    #[tokio::test]
    async fn test_grid_movement_is_clamped() {
        let mut app = fixture_app().await;
        app.open_picker();
        let query = app.drill.pick_book(19).unwrap();
        app.drill.bounds_ready(query, 150);

        handle_event(&mut app, key(KeyCode::Char('h'))).unwrap();
        assert_eq!(app.grid_index, 0);
        handle_event(&mut app, key(KeyCode::Char('l'))).unwrap();
        handle_event(&mut app, key(KeyCode::Char('j'))).unwrap();
        assert_eq!(app.grid_index, 1 + GRID_COLS);
    }

    #[tokio::test]
    async fn test_whole_chapter_commit_key() {
        let mut app = fixture_app().await;
        app.open_picker();
        let query = app.drill.pick_book(19).unwrap();
        app.drill.bounds_ready(query, 150);

        for _ in 0..118 {
            app.grid_move(1);
        }
        handle_event(&mut app, key(KeyCode::Char('o'))).unwrap();
        assert!(!app.drill.is_open());
        assert_eq!(app.reference, Reference { book: 19, chapter: 119, verse: None });
    }
}
