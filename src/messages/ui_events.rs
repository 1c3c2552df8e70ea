//! UI events - messages from the input layer to the App layer

use crate::models::{Category, SortBy};

/// What the list area currently shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    List,
    Favorites,
    /// Detail of one article, by URL
    Article(String),
}

/// Events generated from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    // Fetching
    LoadNews,
    LoadMore,
    Search(String),
    ClearSearch,

    // Filters
    SetCategory(Category),
    SetSortBy(SortBy),

    // Navigation (1-based positions in the visible list)
    ShowList,
    ShowFavorites,
    OpenArticle(usize),

    // Favorites
    ToggleFavorite(usize),

    // Preferences
    ToggleTheme,

    // Popups
    ToggleHelp,

    // System
    Quit,
}

pub const HELP_TEXT: &str = r#"
 TECHNEWS - Commands

 NEWS
   load                 Load the first page
   more                 Load the next page
   search <query>       Search all articles
   clear                Drop the search and reload
   category <name>      all | tech | ai | business | science
   sort <name>          date | popularity | relevancy

 ARTICLES
   list                 Show the article list
   open <n>             Show article n
   fav <n>              Toggle article n as favorite
   favorites            Show favorites

 GENERAL
   theme                Toggle dark theme
   help                 Toggle this help
   quit                 Exit
"#;

/// Convert an input line to a UI event
pub fn line_to_ui_event(line: &str) -> Result<UiEvent, String> {
    let line = line.trim();
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    let event = match command.to_lowercase().as_str() {
        "load" | "refresh" | "r" => UiEvent::LoadNews,
        "more" | "m" => UiEvent::LoadMore,
        "search" | "s" | "/" => {
            if arg.is_empty() {
                return Err("Enter a search query".to_string());
            }
            UiEvent::Search(arg.to_string())
        }
        "clear" => UiEvent::ClearSearch,
        "category" | "c" => UiEvent::SetCategory(arg.parse()?),
        "sort" => UiEvent::SetSortBy(arg.parse()?),
        "list" | "back" | "b" => UiEvent::ShowList,
        "favorites" | "favs" => UiEvent::ShowFavorites,
        "open" | "o" => UiEvent::OpenArticle(parse_position(arg)?),
        "fav" | "f" => UiEvent::ToggleFavorite(parse_position(arg)?),
        "theme" | "t" => UiEvent::ToggleTheme,
        "help" | "?" => UiEvent::ToggleHelp,
        "quit" | "q" | "exit" => UiEvent::Quit,
        "" => return Err("Empty command".to_string()),
        other => return Err(format!("Unknown command '{}', type 'help'", other)),
    };
    Ok(event)
}

fn parse_position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("Expected an article number, got '{}'", arg)),
    }
}
