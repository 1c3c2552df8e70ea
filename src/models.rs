use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publisher of an article
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: String,
}

/// A single news article as returned by the API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    /// ISO-8601 timestamp, kept as sent
    pub published_at: String,
    pub content: Option<String>,
}

impl Article {
    /// Parsed publication time, if the API sent a valid RFC 3339 timestamp
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Publication date as `MMM dd, yyyy`, or the raw string when unparsable
    pub fn display_date(&self) -> String {
        self.published_at_utc()
            .map(|dt| dt.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| self.published_at.clone())
    }
}

/// Top-level JSON object wrapping a page of articles
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    pub articles: Vec<Article>,
}

/// Error body sent by the API alongside a non-2xx status
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// News category filter
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Category {
    All,
    #[default]
    Technology,
    AI,
    Business,
    Science,
}

impl Category {
    /// Search phrase sent as `q`; empty for `All`, which uses top headlines
    pub fn query(&self) -> &'static str {
        match self {
            Category::All => "",
            Category::Technology => "technology",
            Category::AI => "artificial intelligence",
            Category::Business => "business technology",
            Category::Science => "science technology",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All news",
            Category::Technology => "Technology",
            Category::AI => "AI",
            Category::Business => "Business",
            Category::Science => "Science",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Category::All),
            "technology" | "tech" => Ok(Category::Technology),
            "ai" => Ok(Category::AI),
            "business" => Ok(Category::Business),
            "science" => Ok(Category::Science),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Sort order for search results, serialized as the API's `sortBy` value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Popularity,
    Relevancy,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::PublishedAt, SortBy::Popularity, SortBy::Relevancy];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Popularity => "popularity",
            SortBy::Relevancy => "relevancy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "By date",
            SortBy::Popularity => "By popularity",
            SortBy::Relevancy => "By relevancy",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "publishedat" | "date" | "latest" => Ok(SortBy::PublishedAt),
            "popularity" | "popular" => Ok(SortBy::Popularity),
            "relevancy" | "relevance" => Ok(SortBy::Relevancy),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Favorite articles, keyed by URL and kept in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    articles: Vec<Article>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, article: &Article) -> bool {
        self.articles.iter().any(|a| a.url == article.url)
    }

    /// New set with `article` added if absent, removed otherwise
    pub fn toggled(&self, article: &Article) -> FavoriteSet {
        let mut articles = self.articles.clone();
        if let Some(pos) = articles.iter().position(|a| a.url == article.url) {
            articles.remove(pos);
        } else {
            articles.push(article.clone());
        }
        FavoriteSet { articles }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn sample_article(n: u32) -> Article {
    Article {
        source: Source {
            id: Some("wired".to_string()),
            name: "Wired".to_string(),
        },
        author: Some("Jane Doe".to_string()),
        title: format!("Article {}", n),
        description: Some(format!("Description {}", n)),
        url: format!("https://example.com/articles/{}", n),
        url_to_image: None,
        published_at: "2024-03-05T10:15:00Z".to_string(),
        content: None,
    }
}
