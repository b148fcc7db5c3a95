use crate::domain::{Article, Keyword, ScoredArticle};

/// Scores articles against a fixed set of trending keywords.
///
/// A keyword counts when its term occurs anywhere in the lower-cased title
/// or description, including inside a longer word. Each keyword contributes
/// its frequency at most once per article.
pub struct ArticleScorer<'a> {
    keywords: &'a [Keyword],
}

impl<'a> ArticleScorer<'a> {
    pub fn new(keywords: &'a [Keyword]) -> Self {
        Self { keywords }
    }

    pub fn score(&self, article: &Article) -> u64 {
        let blob = format!(
            "{} {}",
            article.title.to_lowercase(),
            article.description.to_lowercase()
        );

        self.keywords
            .iter()
            .filter(|k| !k.term.is_empty() && blob.contains(k.term.as_str()))
            .map(|k| u64::from(k.frequency))
            .sum()
    }

    pub fn score_all(&self, articles: Vec<Article>) -> Vec<ScoredArticle> {
        articles
            .into_iter()
            .map(|article| {
                let score = self.score(&article);
                ScoredArticle { article, score }
            })
            .collect()
    }
}
