use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{rendered_verse_text, wrapped_line_count, App, LoadState, GRID_COLS};
use crate::nav::DrillStep;
use crate::verse::Verse;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.drill.is_open() {
        render_picker(app, frame, body_area);
    } else {
        render_reader(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let translation = app.translation.as_deref().unwrap_or("Bible");
    let title = Line::from(vec![
        Span::styled(format!(" {} ", translation), Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.reader_title(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.drill.is_open() {
        match app.drill.step() {
            DrillStep::Book => " type: filter | ↑↓: move | Enter: select | Esc: close",
            DrillStep::Chapter => " hjkl: move | Enter: verses | o: open chapter | Bksp: back",
            DrillStep::Verse => " hjkl: move | Enter: go to verse | Bksp: back | Esc: close",
        }
    } else {
        " j/k: scroll | h/l: chapter | /: find | q: quit"
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_reader(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.reader_title());
    let inner = block.inner(area);

    // Remember the viewport so scroll targets use the real wrap width.
    app.content_width = inner.width;
    app.content_height = inner.height;

    match &app.load_state {
        LoadState::Loading => {
            frame.render_widget(
                Paragraph::new("Loading...")
                    .block(block)
                    .style(Style::default().fg(Color::DarkGray)),
                area,
            );
        }
        LoadState::Failed(message) => {
            let text = Text::from(vec![
                Line::from("Could not load this chapter.".red().bold()),
                Line::raw(""),
                Line::from(message.as_str().dark_gray()),
            ]);
            frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
        }
        LoadState::Ready => {
            let highlighted = app.highlight.highlighted();
            let mut lines: Vec<Line> = Vec::new();
            for verse in &app.verses {
                let is_highlighted = highlighted == Some(verse.verse);
                lines.push(verse_line(verse, is_highlighted));
                lines.push(Line::raw(""));
            }

            // Same estimate as App::verse_line_offset.
            let wrap_width = inner.width.max(1) as usize;
            app.total_content_lines = app
                .verses
                .iter()
                .map(|v| wrapped_line_count(&rendered_verse_text(v), wrap_width) + 1)
                .sum();

            let paragraph = Paragraph::new(Text::from(lines))
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((app.content_scroll, 0));
            frame.render_widget(paragraph, area);
        }
    }
}

/// One verse as a styled line: dim verse number, italic supplied words,
/// background tint while highlighted.
fn verse_line(verse: &Verse, highlighted: bool) -> Line<'static> {
    let base = if highlighted {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::styled(
        format!("{} ", verse.verse),
        base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];
    for segment in verse.segments() {
        let style = if segment.supplied {
            base.add_modifier(Modifier::ITALIC)
        } else {
            base
        };
        spans.push(Span::styled(segment.text, style));
    }
    Line::from(spans)
}

fn render_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.picker_title());

    match app.drill.step() {
        DrillStep::Book => render_book_step(app, frame, area, block),
        DrillStep::Chapter | DrillStep::Verse => render_grid_step(app, frame, area, block),
    }
}

fn render_book_step(app: &mut App, frame: &mut Frame, area: Rect, block: Block) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    let search = Line::from(vec![
        Span::styled("Find book: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.drill.query.clone()),
        Span::styled("█", Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(search), search_area);

    let items: Vec<ListItem> = app
        .filtered_books()
        .into_iter()
        .map(|(_, name)| ListItem::new(name))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.book_list_state);
}

/// Chapter and verse steps share one rendering: the numbers 1..=max laid out
/// in rows of GRID_COLS with the cursor highlighted.
fn render_grid_step(app: &mut App, frame: &mut Frame, area: Rect, block: Block) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let count = app.drill.grid_len() as usize;
    let mut lines: Vec<Line> = Vec::new();

    if let Some(message) = &app.picker_error {
        lines.push(Line::from(message.as_str().red()));
        lines.push(Line::raw(""));
    }

    for row_start in (0..count).step_by(GRID_COLS) {
        let mut spans = Vec::new();
        for i in row_start..(row_start + GRID_COLS).min(count) {
            let style = if i == app.grid_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!("{:>4}", i + 1), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::raw(""));
    }

    // Keep the cursor's row visible when the grid outgrows the viewport.
    let cursor_row = (app.grid_index / GRID_COLS) as u16 * 2;
    let scroll = cursor_row.saturating_sub(inner.height.saturating_sub(2));

    frame.render_widget(
        Paragraph::new(Text::from(lines)).scroll((scroll, 0)),
        inner,
    );
}
