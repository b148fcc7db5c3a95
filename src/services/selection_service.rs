//! Two-pass selection: discover trending keywords from the days before
//! yesterday, then rank yesterday's articles by those keywords and write the
//! best ones out.

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{Article, DateWindow, Keyword, NewsEntry, RawArticle, ScoredArticle};
use crate::errors::TrendResult;
use crate::services::keyword_service::KeywordExtractor;
use crate::services::scoring_service::ArticleScorer;
use crate::sources::{ArticleQuery, ArticleSource, FetchOutcome};
use crate::storage::ArticleWriter;

/// Why a run stopped before writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    TrendFetchFailed,
    NoTrendingKeywords,
    CandidateFetchFailed,
    NoCandidates,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AbortReason::TrendFetchFailed => "trend pool could not be fetched",
            AbortReason::NoTrendingKeywords => "no trending keywords found",
            AbortReason::CandidateFetchFailed => "candidate pool could not be fetched",
            AbortReason::NoCandidates => "no usable candidate articles",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Written { count: usize },
    Aborted(AbortReason),
}

pub struct SelectionService<S: ArticleSource, W: ArticleWriter> {
    source: S,
    writer: W,
    config: Config,
    extractor: KeywordExtractor,
}

impl<S: ArticleSource, W: ArticleWriter> SelectionService<S, W> {
    pub fn new(source: S, writer: W, config: Config) -> Self {
        let extractor = KeywordExtractor::from_config(&config);
        Self {
            source,
            writer,
            config,
            extractor,
        }
    }

    /// Run both passes for the given day and write the result. Empty or
    /// failed pools end the run with [`RunOutcome::Aborted`] and leave the
    /// output untouched; only a failed write is an error.
    pub fn run(&self, today: NaiveDate) -> TrendResult<RunOutcome> {
        let trend_window = DateWindow::trend(today, self.config.trend_window_days);
        let candidate_window = DateWindow::candidate(today);
        info!(%trend_window, %candidate_window, query = %self.config.query, "Starting trend selection");

        let keywords = match self.discover_trends(trend_window) {
            Ok(keywords) => keywords,
            Err(reason) => return Ok(self.abort(reason)),
        };

        let candidates = match self.fetch_candidates(candidate_window) {
            Ok(candidates) => candidates,
            Err(reason) => return Ok(self.abort(reason)),
        };

        let selected = self.select(candidates, &keywords);
        for (rank, scored) in selected.iter().enumerate() {
            debug!(rank = rank + 1, score = scored.score, title = %scored.article.title, "Selected article");
        }

        let entries: Vec<NewsEntry> = selected
            .into_iter()
            .map(|scored| NewsEntry::from(scored.article))
            .collect();
        self.writer.write(&entries)?;

        info!(count = entries.len(), "Trend selection complete");
        Ok(RunOutcome::Written {
            count: entries.len(),
        })
    }

    /// Pass 1: fetch the trend pool and extract its top keywords.
    pub fn discover_trends(&self, window: DateWindow) -> Result<Vec<Keyword>, AbortReason> {
        let raw = self
            .fetch(window, self.config.trend_pool_size)
            .ok_or(AbortReason::TrendFetchFailed)?;
        let pool = valid_articles(raw);

        let keywords = self.extractor.extract(&pool);
        if keywords.is_empty() {
            return Err(AbortReason::NoTrendingKeywords);
        }

        info!(
            pool = pool.len(),
            keywords = %keywords
                .iter()
                .map(|k| format!("{}({})", k.term, k.frequency))
                .collect::<Vec<_>>()
                .join(", "),
            "Trending keywords"
        );
        Ok(keywords)
    }

    /// Pass 2: fetch the candidate pool and drop unusable records.
    pub fn fetch_candidates(&self, window: DateWindow) -> Result<Vec<Article>, AbortReason> {
        let raw = self
            .fetch(window, self.config.candidate_pool_size)
            .ok_or(AbortReason::CandidateFetchFailed)?;

        let candidates = valid_articles(raw);
        if candidates.is_empty() {
            return Err(AbortReason::NoCandidates);
        }

        info!(count = candidates.len(), "Candidate articles ready for scoring");
        Ok(candidates)
    }

    /// Score, rank and truncate to the target count. Equal scores keep the
    /// order the source returned them in.
    pub fn select(&self, candidates: Vec<Article>, keywords: &[Keyword]) -> Vec<ScoredArticle> {
        let mut scored = ArticleScorer::new(keywords).score_all(candidates);
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.config.target_count);
        scored
    }

    fn fetch(&self, window: DateWindow, page_size: u32) -> Option<Vec<RawArticle>> {
        let query = ArticleQuery {
            query: self.config.query.clone(),
            window,
            page_size,
            sort_order: self.config.sort_order,
        };

        match self.source.fetch(&query) {
            FetchOutcome::Fetched(articles) => Some(articles),
            FetchOutcome::Failed(e) => {
                warn!(%window, error = %e, "Fetch failed");
                None
            }
        }
    }

    fn abort(&self, reason: AbortReason) -> RunOutcome {
        warn!(%reason, path = %self.config.output_path.display(), "Aborting run; output left unchanged");
        RunOutcome::Aborted(reason)
    }
}

fn valid_articles(raw: Vec<RawArticle>) -> Vec<Article> {
    let total = raw.len();
    let articles: Vec<Article> = raw.into_iter().filter_map(RawArticle::into_article).collect();
    if articles.len() < total {
        debug!(dropped = total - articles.len(), "Dropped articles without usable title or url");
    }
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrendError;
    use crate::sources::traits::MockArticleSource;
    use crate::storage::traits::MockArticleWriter;
    use crate::storage::YamlFileWriter;
    use std::fs;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 16).unwrap()
    }

    fn config() -> Config {
        Config::new("test-key")
            .unwrap()
            .with_query("AI")
            .with_target_count(2)
            .with_trend_window_days(7)
    }

    fn raw(title: &str, description: &str) -> RawArticle {
        RawArticle::new(title)
            .with_description(description)
            .with_url(&format!("https://example.com/{}", title.replace(' ', "-")))
            .with_source_name("Wire")
    }

    fn trend_pool() -> Vec<RawArticle> {
        vec![
            raw("Sora launches", ""),
            raw("Sora launches", ""),
            raw("Nvidia chips", ""),
        ]
    }

    /// Source answering the trend window and the candidate window separately.
    fn source_with(trend: FetchOutcome, candidates: FetchOutcome) -> MockArticleSource {
        let trend_window = DateWindow::trend(today(), 7);
        let candidate_window = DateWindow::candidate(today());

        let mut source = MockArticleSource::new();
        let mut trend = Some(trend);
        source
            .expect_fetch()
            .withf(move |q| q.window == trend_window)
            .times(1)
            .returning(move |_| trend.take().unwrap_or(FetchOutcome::Fetched(vec![])));
        let mut candidates = Some(candidates);
        source
            .expect_fetch()
            .withf(move |q| q.window == candidate_window)
            .times(0..=1)
            .returning(move |_| candidates.take().unwrap_or(FetchOutcome::Fetched(vec![])));
        source
    }

    fn failed() -> FetchOutcome {
        FetchOutcome::Failed(TrendError::Api {
            code: "rateLimited".to_string(),
            message: "Too many requests".to_string(),
        })
    }

    fn unused_writer() -> MockArticleWriter {
        let mut writer = MockArticleWriter::new();
        writer.expect_write().times(0);
        writer
    }

    #[test]
    fn test_matching_candidate_ranks_first() {
        let source = source_with(
            FetchOutcome::Fetched(trend_pool()),
            FetchOutcome::Fetched(vec![
                raw("Weather today", "Sunny"),
                raw("Markets close", "Stocks flat"),
                raw("Video model", "OpenAI shows Sora to testers"),
            ]),
        );
        let mut writer = MockArticleWriter::new();
        writer
            .expect_write()
            .withf(|entries| entries.len() == 2 && entries[0].title == "Video model")
            .times(1)
            .returning(|_| Ok(()));

        let service = SelectionService::new(source, writer, config());
        let outcome = service.run(today()).unwrap();

        assert_eq!(outcome, RunOutcome::Written { count: 2 });
    }

    #[test]
    fn test_queries_use_configured_pool_sizes() {
        let trend_window = DateWindow::trend(today(), 7);
        let mut source = MockArticleSource::new();
        source
            .expect_fetch()
            .withf(move |q| q.window == trend_window && q.page_size == 60 && q.query == "AI")
            .times(1)
            .returning(|_| FetchOutcome::Fetched(trend_pool()));
        source
            .expect_fetch()
            .withf(|q| q.page_size == 40)
            .times(1)
            .returning(|_| FetchOutcome::Fetched(vec![raw("Sora", "")]));
        let mut writer = MockArticleWriter::new();
        writer.expect_write().times(1).returning(|_| Ok(()));

        let config = config().with_trend_pool_size(60).with_candidate_pool_size(40);
        let service = SelectionService::new(source, writer, config);

        assert_eq!(service.run(today()).unwrap(), RunOutcome::Written { count: 1 });
    }

    #[test]
    fn test_empty_trend_pool_aborts() {
        let source = source_with(FetchOutcome::Fetched(vec![]), FetchOutcome::Fetched(vec![]));
        let service = SelectionService::new(source, unused_writer(), config());

        assert_eq!(
            service.run(today()).unwrap(),
            RunOutcome::Aborted(AbortReason::NoTrendingKeywords)
        );
    }

    #[test]
    fn test_trend_pool_of_stop_words_aborts() {
        let source = source_with(
            FetchOutcome::Fetched(vec![raw("The AI", ""), raw("2024", "")]),
            FetchOutcome::Fetched(vec![]),
        );
        let service = SelectionService::new(source, unused_writer(), config());

        assert_eq!(
            service.run(today()).unwrap(),
            RunOutcome::Aborted(AbortReason::NoTrendingKeywords)
        );
    }

    #[test]
    fn test_failed_trend_fetch_aborts() {
        let source = source_with(failed(), FetchOutcome::Fetched(vec![]));
        let service = SelectionService::new(source, unused_writer(), config());

        assert_eq!(
            service.run(today()).unwrap(),
            RunOutcome::Aborted(AbortReason::TrendFetchFailed)
        );
    }

    #[test]
    fn test_failed_candidate_fetch_aborts() {
        let source = source_with(FetchOutcome::Fetched(trend_pool()), failed());
        let service = SelectionService::new(source, unused_writer(), config());

        assert_eq!(
            service.run(today()).unwrap(),
            RunOutcome::Aborted(AbortReason::CandidateFetchFailed)
        );
    }

    #[test]
    fn test_empty_candidate_pool_aborts() {
        let source = source_with(FetchOutcome::Fetched(trend_pool()), FetchOutcome::Fetched(vec![]));
        let service = SelectionService::new(source, unused_writer(), config());

        assert_eq!(
            service.run(today()).unwrap(),
            RunOutcome::Aborted(AbortReason::NoCandidates)
        );
    }

    #[test]
    fn test_only_removed_candidates_aborts() {
        let source = source_with(
            FetchOutcome::Fetched(trend_pool()),
            FetchOutcome::Fetched(vec![raw("[Removed]", "sora"), RawArticle::default()]),
        );
        let service = SelectionService::new(source, unused_writer(), config());

        assert_eq!(
            service.run(today()).unwrap(),
            RunOutcome::Aborted(AbortReason::NoCandidates)
        );
    }

    #[test]
    fn test_empty_trend_pool_leaves_existing_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("_data").join("news.yml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "sentinel\n").unwrap();

        let source = source_with(FetchOutcome::Fetched(vec![]), FetchOutcome::Fetched(vec![]));
        let config = config().with_output_path(&path);
        let service = SelectionService::new(source, YamlFileWriter::new(&path), config);

        let outcome = service.run(today()).unwrap();

        assert!(matches!(outcome, RunOutcome::Aborted(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "sentinel\n");
    }

    #[test]
    fn test_writes_ranked_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("_data").join("news.yml");

        let source = source_with(
            FetchOutcome::Fetched(trend_pool()),
            FetchOutcome::Fetched(vec![
                raw("Chips shortage", "Nvidia raises prices"),
                raw("[Removed]", "Sora Nvidia launches"),
                raw("Sora launches widely", "Nvidia chips power it"),
                raw("Gardening tips", ""),
            ]),
        );
        let service =
            SelectionService::new(source, YamlFileWriter::new(&path), config().with_output_path(&path));

        assert_eq!(service.run(today()).unwrap(), RunOutcome::Written { count: 2 });

        let entries: Vec<NewsEntry> =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Sora launches widely", "Chips shortage"]);
        assert_eq!(entries[0].source, "Wire");
        assert_eq!(entries[0].description, "Nvidia chips power it");
    }

    #[test]
    fn test_writer_error_propagates() {
        let source = source_with(
            FetchOutcome::Fetched(trend_pool()),
            FetchOutcome::Fetched(vec![raw("Sora", "")]),
        );
        let mut writer = MockArticleWriter::new();
        writer.expect_write().times(1).returning(|_| {
            Err(TrendError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

        let service = SelectionService::new(source, writer, config());

        assert!(matches!(service.run(today()), Err(TrendError::Io(_))));
    }

    fn offline_service(target_count: usize) -> SelectionService<MockArticleSource, MockArticleWriter> {
        SelectionService::new(
            MockArticleSource::new(),
            MockArticleWriter::new(),
            config().with_target_count(target_count),
        )
    }

    fn articles(titles: &[&str]) -> Vec<Article> {
        titles
            .iter()
            .map(|t| Article::new(t, "https://example.com"))
            .collect()
    }

    #[test]
    fn test_select_length_is_min_of_target_and_candidates() {
        let keywords = vec![Keyword::new("sora", 2)];
        let pool = articles(&["sora one", "two", "three"]);

        for target in 1..=5 {
            let selected = offline_service(target).select(pool.clone(), &keywords);
            assert_eq!(selected.len(), target.min(pool.len()));
        }
    }

    #[test]
    fn test_select_ties_keep_fetch_order() {
        let keywords = vec![Keyword::new("sora", 2), Keyword::new("nvidia", 1)];
        let pool = articles(&["plain a", "nvidia b", "plain c", "sora d", "nvidia e"]);

        let titles: Vec<String> = offline_service(5)
            .select(pool, &keywords)
            .into_iter()
            .map(|s| s.article.title)
            .collect();

        assert_eq!(titles, vec!["sora d", "nvidia b", "nvidia e", "plain a", "plain c"]);
    }

    #[test]
    fn test_select_is_idempotent() {
        let keywords = vec![Keyword::new("sora", 2), Keyword::new("chips", 1)];
        let pool = articles(&["chips", "sora", "none", "sora chips", "chips again"]);
        let service = offline_service(3);

        let first = service.select(pool.clone(), &keywords);
        let second = service.select(pool, &keywords);

        assert_eq!(first, second);
    }

    #[test]
    fn test_abort_reason_display() {
        assert_eq!(
            AbortReason::NoTrendingKeywords.to_string(),
            "no trending keywords found"
        );
    }
}
