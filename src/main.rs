mod activity;
mod app;
mod calendar;
mod config;
mod diary_entry;
mod diary_state;
mod gallery;
mod logging;
mod modal;
mod picker;
mod ui;

use app::{App, PickRequest};
use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use config::{Cli, Config};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::future::{BoxFuture, FutureExt, OptionFuture};
use futures::StreamExt;
use picker::{PhotoPicker, PickOutcome};
use ui::UI;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::load(&cli).await.wrap_err("Failed to load configuration")?;

    if let Some(path) = config.log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("Logging disabled: {e:#}");
        }
    }
    tracing::info!(?config, "starting plant diary");

    let entries = config.load_entries().await.wrap_err("Failed to load diary entries")?;
    tracing::info!(count = entries.len(), "loaded seed entries");

    let mut app = App::new(entries, Local::now().date_naive(), config.week_start);
    if app.diary().is_empty() {
        tracing::warn!("starting with an empty diary");
    }
    let photo_picker = picker::from_command(&config.picker_command);
    let mut ui = UI::new()?;

    run(&mut app, &mut ui, photo_picker.as_ref()).await?;

    tracing::info!(entries = app.diary().len(), "quitting; diary is not saved");
    Ok(())
}

type PendingPick = BoxFuture<'static, (PickRequest, PickOutcome)>;

async fn run(app: &mut App, ui: &mut UI, photo_picker: &dyn PhotoPicker) -> Result<()> {
    let mut events = EventStream::new();
    let mut pending: Option<PendingPick> = None;

    while !app.should_quit() {
        ui.display(app)?;

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                if let Event::Key(key) = event? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if let Some(request) = app.handle_key(key) {
                        let pick = photo_picker.pick();
                        pending = Some(async move { (request, pick.await) }.boxed());
                    }
                }
            }
            Some((request, outcome)) = OptionFuture::from(pending.as_mut()), if pending.is_some() => {
                pending = None;
                app.apply_pick(request, outcome);
            }
        }

        if !app.has_pending_pick() && pending.take().is_some() {
            tracing::debug!("editor closed; abandoning photo picker");
        }
    }

    Ok(())
}
