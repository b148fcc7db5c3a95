use serde::{Deserialize, Serialize};

/// Title NewsAPI substitutes for articles that were taken down.
pub const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Source name used when the API does not report one.
pub const UNKNOWN_SOURCE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// An article record exactly as the news API returns it. Any field may be
/// absent or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
}

impl RawArticle {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_source_name(mut self, name: &str) -> Self {
        self.source = Some(RawSource {
            name: Some(name.to_string()),
        });
        self
    }

    /// Validate the record and turn it into an [`Article`].
    ///
    /// Returns `None` when the title is missing, blank or the removal
    /// placeholder, or when there is no url to link to.
    pub fn into_article(self) -> Option<Article> {
        let title = self.title?.trim().to_string();
        if title.is_empty() || title == REMOVED_PLACEHOLDER {
            return None;
        }

        let url = self.url?.trim().to_string();
        if url.is_empty() {
            return None;
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        let source_name = self
            .source
            .and_then(|s| s.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Some(Article {
            title,
            description,
            url,
            source_name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source_name: String,
}

impl Article {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            url: url.to_string(),
            source_name: UNKNOWN_SOURCE.to_string(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_source_name(mut self, source_name: &str) -> Self {
        self.source_name = source_name.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: u64,
}

/// One record of the output data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsEntry {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
}

impl From<Article> for NewsEntry {
    fn from(article: Article) -> Self {
        Self {
            title: article.title,
            description: article.description,
            url: article.url,
            source: article.source_name,
        }
    }
}
