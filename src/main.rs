mod app;
mod catalog;
mod config;
mod handler;
mod highlight;
mod nav;
mod store;
mod tui;
mod ui;
mod verse;

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use app::App;
use config::Config;
use store::VerseStore;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "canon")]
#[command(about = "Terminal reader for the King James Bible")]
struct Cli {
    /// Path to the verses database (overrides the config file)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // File logger; the terminal is owned by the TUI.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("canon.log") {
        let _ = WriteLogger::init(LevelFilter::Info, log_config, log_file);
    }

    let config = Config::load().unwrap_or_default();
    let database = cli
        .database
        .or(config.database_path)
        .unwrap_or_else(|| PathBuf::from("kjv.sqlite"));

    log::info!("opening verses database at {}", database.display());
    let store = VerseStore::open(&database)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(store, events.sender()).await?;

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;

        // A jump-to-verse can only be resolved once the chapter is loaded
        // and the viewport dimensions are known from a draw.
        app.apply_pending_highlight(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
