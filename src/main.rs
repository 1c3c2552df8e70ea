//! technews - headless news client
//!
//! Architecture:
//! - Input loop - reads commands from stdin and prints render state
//! - App Layer - applies commands to the news controller
//! - Fetch tasks (Tokio) - async HTTP calls to the news API

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use technews::config;
use technews::constants::{API_KEY_ENV, DEFAULT_LOG_FILE};
use technews::messages::ui_events::HELP_TEXT;
use technews::{
    line_to_ui_event, AppActor, AppConfig, NewsController, PreferenceStore, RenderState,
    ReqwestNewsClient, UiEvent, UiState, View,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    // Initialize logging to file
    let log_dir = config
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .unwrap_or(OsStr::new(DEFAULT_LOG_FILE));
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let api_key = config.api_key.clone().with_context(|| {
        let location = config::default_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "config.yaml".to_string());
        format!("No API key configured: set {} or api_key in {}", API_KEY_ENV, location)
    })?;

    let client = ReqwestNewsClient::new(config.base_url.as_str())
        .context("Failed to create HTTP client")?;
    let controller = Arc::new(
        NewsController::new(Arc::new(client), api_key)
            .with_page_size(config.page_size)
            .with_language(config.language.as_str()),
    );

    let prefs_path = config
        .preferences_path()
        .context("Could not determine where to store preferences")?;
    let preferences = PreferenceStore::open(prefs_path)
        .await
        .context("Failed to open preferences")?;

    tracing::info!(base_url = %config.base_url, "Starting technews");

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn app actor
    let app_actor = AppActor::new(controller, preferences, render_tx);
    let actor_task = tokio::spawn(app_actor.run(ui_rx));

    let _ = ui_tx.send(UiEvent::LoadNews);

    run_input_loop(ui_tx, &mut render_rx).await?;
    let _ = actor_task.await;

    Ok(())
}

/// Forward input lines to the actor and draw every new render state
async fn run_input_loop(
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_drawn: Option<RenderState> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    let _ = ui_tx.send(UiEvent::Quit);
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line_to_ui_event(&line) {
                    Ok(event) => {
                        let quit = event == UiEvent::Quit;
                        let _ = ui_tx.send(event);
                        if quit {
                            break;
                        }
                    }
                    Err(message) => println!("! {}", message),
                }
            }
            Some(state) = render_rx.recv() => {
                if last_drawn.as_ref() != Some(&state) {
                    draw(&state)?;
                    last_drawn = Some(state);
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn draw(state: &RenderState) -> io::Result<()> {
    let mut out = io::stdout().lock();

    let query = if state.search_query.is_empty() {
        String::new()
    } else {
        format!(" | search: \"{}\"", state.search_query)
    };
    writeln!(
        out,
        "\n== {} | {}{} | {} theme | {} favorites ==",
        state.category,
        state.sort_by,
        query,
        if state.dark_theme { "dark" } else { "light" },
        state.favorites.len()
    )?;

    match &state.view {
        View::Article(_) => draw_article(&mut out, state)?,
        View::Favorites => {
            writeln!(out, "-- Favorites --")?;
            draw_list(&mut out, state)?;
        }
        View::List => match &state.ui_state {
            UiState::Loading => writeln!(out, "Loading...")?,
            UiState::Error(message) => writeln!(out, "Error: {}", message)?,
            UiState::Success(_) => {
                draw_list(&mut out, state)?;
                if state.has_more_pages {
                    writeln!(out, "(type 'more' for the next page)")?;
                }
            }
        },
    }

    if let Some(notice) = &state.notice {
        writeln!(out, "! {}", notice)?;
    }
    if state.show_help {
        writeln!(out, "{}", HELP_TEXT)?;
    }
    out.flush()
}

fn draw_list(out: &mut impl Write, state: &RenderState) -> io::Result<()> {
    let articles = state.visible_articles();
    if articles.is_empty() {
        return writeln!(out, "No articles.");
    }
    for (i, article) in articles.iter().enumerate() {
        let marker = if state.is_favorite(article) { "*" } else { " " };
        writeln!(
            out,
            "{:>3}.{} {} ({}, {})",
            i + 1,
            marker,
            article.title,
            article.source.name,
            article.display_date()
        )?;
    }
    Ok(())
}

fn draw_article(out: &mut impl Write, state: &RenderState) -> io::Result<()> {
    let Some(article) = state.open_article() else {
        return writeln!(out, "Article not found.");
    };

    writeln!(out, "{}", article.title)?;
    writeln!(
        out,
        "{} | {}{}",
        article.source.name,
        article.display_date(),
        article
            .author
            .as_deref()
            .map(|a| format!(" | by {}", a))
            .unwrap_or_default()
    )?;
    if let Some(description) = &article.description {
        writeln!(out, "\n{}", description)?;
    }
    if let Some(content) = &article.content {
        writeln!(out, "\n{}", content)?;
    }
    writeln!(out, "\n{}", article.url)?;
    if state.is_favorite(article) {
        writeln!(out, "[favorite]")?;
    }
    Ok(())
}
