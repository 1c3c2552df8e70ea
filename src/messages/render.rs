//! Render state - snapshot sent from the App layer to the output loop

use crate::app::state::UiState;
use crate::messages::ui_events::View;
use crate::models::{Article, Category, FavoriteSet, SortBy};

/// Everything the output layer needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    pub view: View,
    pub ui_state: UiState,
    pub category: Category,
    pub sort_by: SortBy,
    pub search_query: String,
    pub favorites: FavoriteSet,
    pub has_more_pages: bool,
    pub dark_theme: bool,

    // Popups
    pub show_help: bool,
    pub notice: Option<String>,
}

impl RenderState {
    /// Articles listed in the current view, in display order
    pub fn visible_articles(&self) -> Vec<&Article> {
        match self.view {
            View::Favorites => self.favorites.iter().collect(),
            _ => self
                .ui_state
                .articles()
                .map(|articles| articles.iter().collect())
                .unwrap_or_default(),
        }
    }

    /// The article opened in the detail view, if it is still known
    pub fn open_article(&self) -> Option<&Article> {
        let View::Article(url) = &self.view else {
            return None;
        };
        self.ui_state
            .articles()
            .into_iter()
            .flatten()
            .chain(self.favorites.iter())
            .find(|a| &a.url == url)
    }

    pub fn is_favorite(&self, article: &Article) -> bool {
        self.favorites.contains(article)
    }
}
