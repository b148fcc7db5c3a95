use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::Config;
use crate::domain::{Article, Keyword};
use crate::text::{Tokenizer, UnicodeTokenizer};

/// Finds the most frequent title terms in a pool of articles.
pub struct KeywordExtractor<T: Tokenizer = UnicodeTokenizer> {
    tokenizer: T,
    stop_words: HashSet<String>,
    top_k: usize,
}

impl KeywordExtractor<UnicodeTokenizer> {
    pub fn new<I, S>(stop_words: I, top_k: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_tokenizer(UnicodeTokenizer::new(), stop_words, top_k)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.stop_words, config.top_keyword_count)
            .with_topic_terms(&config.topic_terms)
    }
}

impl<T: Tokenizer> KeywordExtractor<T> {
    /// Stop words match tokens exactly, after lower-casing.
    pub fn with_tokenizer<I, S>(tokenizer: T, stop_words: I, top_k: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = stop_words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            tokenizer,
            stop_words,
            top_k,
        }
    }

    /// Suppress the search terms. Each term is also registered in tokenized
    /// form, so a Han term the tokenizer splits into bigrams never shows up
    /// piecewise.
    pub fn with_topic_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            self.stop_words.extend(self.tokenizer.tokenize(&term));
            self.stop_words.insert(term);
        }
        self
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn is_candidate(&self, token: &str) -> bool {
        token.chars().count() > 1 && !is_numeric(token) && !self.is_stop_word(token)
    }

    /// Rank title tokens by frequency, highest first. Equal frequencies keep
    /// the order in which the tokens were first seen.
    pub fn extract(&self, articles: &[Article]) -> Vec<Keyword> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut keywords: Vec<Keyword> = Vec::new();

        for article in articles {
            for token in self.tokenizer.tokenize(&article.title.to_lowercase()) {
                if !self.is_candidate(&token) {
                    continue;
                }
                match positions.get(&token) {
                    Some(&i) => keywords[i].frequency += 1,
                    None => {
                        positions.insert(token.clone(), keywords.len());
                        keywords.push(Keyword {
                            term: token,
                            frequency: 1,
                        });
                    }
                }
            }
        }

        let distinct = keywords.len();
        keywords.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        keywords.truncate(self.top_k);

        debug!(
            articles = articles.len(),
            distinct_terms = distinct,
            kept = keywords.len(),
            "Extracted keywords"
        );
        keywords
    }
}

fn is_numeric(token: &str) -> bool {
    token.chars().any(char::is_numeric)
        && token.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
}
