//! App actor - message loop turning UI events into controller calls

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::app::state::NewsController;
use crate::messages::{RenderState, UiEvent, View};
use crate::models::Article;
use crate::storage::PreferenceStore;

/// App actor that applies UI events and republishes state on every change
pub struct AppActor {
    controller: Arc<NewsController>,
    preferences: PreferenceStore,
    render_tx: mpsc::UnboundedSender<RenderState>,
    view: View,
    show_help: bool,
    notice: Option<String>,
}

impl AppActor {
    pub fn new(
        controller: Arc<NewsController>,
        preferences: PreferenceStore,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            controller,
            preferences,
            render_tx,
            view: View::List,
            show_help: false,
            notice: None,
        }
    }

    /// Run the actor message loop
    pub async fn run(mut self, mut ui_rx: mpsc::UnboundedReceiver<UiEvent>) {
        let mut ui_state = self.controller.ui_state();
        let mut favorites = self.controller.favorites();
        let mut dark_theme = self.preferences.dark_theme();

        // Send initial render state
        self.emit();

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event).await {
                        break;
                    }
                    self.emit();
                }
                Ok(()) = ui_state.changed() => self.emit(),
                Ok(()) = favorites.changed() => self.emit(),
                Ok(()) = dark_theme.changed() => self.emit(),
                else => break,
            }
        }
        tracing::info!("App actor stopped");
    }

    /// Handle a UI event, returns true if quit was requested
    async fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        self.notice = None;
        let api_key = self.controller.api_key().to_string();

        match event {
            // Fetching
            UiEvent::LoadNews => {
                self.view = View::List;
                if self.controller.load_news(&api_key).is_none() {
                    self.notice = Some("Already loading".to_string());
                }
            }
            UiEvent::LoadMore => {
                self.view = View::List;
                if self.controller.load_more_news(&api_key).is_none() {
                    self.notice = Some(if self.controller.has_more_pages() {
                        "Already loading".to_string()
                    } else {
                        "No more articles".to_string()
                    });
                }
            }
            UiEvent::Search(query) => {
                self.view = View::List;
                self.controller.search_news(&query, &api_key);
            }
            UiEvent::ClearSearch => {
                self.view = View::List;
                self.controller.clear_search();
            }

            // Filters
            UiEvent::SetCategory(category) => {
                self.view = View::List;
                self.controller.set_category(category);
            }
            UiEvent::SetSortBy(sort_by) => {
                if self.controller.set_sort_by(sort_by).is_none() {
                    self.notice = Some(format!(
                        "Sort set to '{}', applies to the next search",
                        sort_by.label()
                    ));
                }
            }

            // Navigation
            UiEvent::ShowList => self.view = View::List,
            UiEvent::ShowFavorites => self.view = View::Favorites,
            UiEvent::OpenArticle(n) => match self.article_at(n) {
                Some(article) => self.view = View::Article(article.url),
                None => self.notice = Some(format!("No article #{}", n)),
            },

            // Favorites
            UiEvent::ToggleFavorite(n) => match self.article_at(n) {
                Some(article) => self.controller.toggle_favorite(&article),
                None => self.notice = Some(format!("No article #{}", n)),
            },

            // Preferences
            UiEvent::ToggleTheme => {
                if let Err(e) = self.preferences.toggle_dark_theme().await {
                    tracing::warn!(error = %e, "Failed to save theme preference");
                    self.notice = Some(format!("Could not save theme: {}", e));
                }
            }

            UiEvent::ToggleHelp => self.show_help = !self.show_help,

            UiEvent::Quit => return true,
        }

        false
    }

    /// Article at 1-based position `n` of the visible list. Positions in the
    /// detail view refer to the article list.
    fn article_at(&self, n: usize) -> Option<Article> {
        let index = n.checked_sub(1)?;
        match self.view {
            View::Favorites => self.controller.favorites().borrow().iter().nth(index).cloned(),
            _ => self
                .controller
                .current_ui_state()
                .articles()
                .and_then(|articles| articles.get(index).cloned()),
        }
    }

    /// Snapshot of everything the output layer draws
    pub fn render_state(&self) -> RenderState {
        RenderState {
            view: self.view.clone(),
            ui_state: self.controller.current_ui_state(),
            category: *self.controller.selected_category().borrow(),
            sort_by: *self.controller.selected_sort_by().borrow(),
            search_query: self.controller.search_query().borrow().clone(),
            favorites: self.controller.favorites().borrow().clone(),
            has_more_pages: self.controller.has_more_pages(),
            dark_theme: self.preferences.is_dark_theme(),
            show_help: self.show_help,
            notice: self.notice.clone(),
        }
    }

    fn emit(&self) {
        let _ = self.render_tx.send(self.render_state());
    }
}
