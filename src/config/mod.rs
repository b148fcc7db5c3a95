use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::{TrendError, TrendResult};
use crate::sources::SortOrder;

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_QUERY: &str = "AI OR 人工智能 OR 人工智慧";
pub const DEFAULT_LANGUAGE: &str = "zh";
pub const DEFAULT_OUTPUT_PATH: &str = "_data/news.yml";
pub const DEFAULT_TARGET_COUNT: usize = 9;
pub const DEFAULT_POOL_SIZE: u32 = 100;
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_TOP_KEYWORD_COUNT: usize = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// NewsAPI rejects larger page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_STOP_WORDS: &[&str] = &[
    // English
    "a", "about", "after", "all", "an", "and", "are", "as", "at", "be", "but", "by", "can",
    "could", "for", "from", "has", "have", "how", "in", "into", "is", "it", "its", "just",
    "more", "new", "not", "now", "of", "on", "or", "our", "out", "over", "says", "than",
    "that", "the", "their", "this", "to", "up", "was", "we", "what", "when", "which", "who",
    "why", "will", "with", "you", "your",
    // Chinese
    "的", "了", "在", "是", "和", "与", "及", "或", "也", "都", "就", "而", "被", "将",
    "对", "从", "把", "这", "那", "我们", "你们", "他们", "一个", "这个", "那个", "什么",
    "如何", "怎么", "为什么", "没有", "可以", "已经", "正在", "表示", "认为", "今天",
    "今年", "目前", "进行", "以及", "还是", "但是", "因为", "所以", "如果", "报道", "消息",
    "新闻", "最新", "发布会",
];

/// Run configuration. Built once at startup and passed by value into the
/// selection pipeline; nothing reads the environment after that.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: String,
    pub query: String,
    pub language: Option<String>,
    pub sort_order: SortOrder,
    pub output_path: PathBuf,
    pub target_count: usize,
    pub candidate_pool_size: u32,
    pub trend_pool_size: u32,
    pub trend_window_days: u32,
    pub top_keyword_count: usize,
    pub stop_words: BTreeSet<String>,
    /// Terms of the search query, never reported as trends.
    pub topic_terms: BTreeSet<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Build a configuration with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> TrendResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(TrendError::MissingEnvVar("NEWS_API_KEY".to_string()));
        }

        let stop_words: BTreeSet<String> =
            DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect();

        Ok(Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: DEFAULT_QUERY.to_string(),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            sort_order: SortOrder::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            target_count: DEFAULT_TARGET_COUNT,
            candidate_pool_size: DEFAULT_POOL_SIZE,
            trend_pool_size: DEFAULT_POOL_SIZE,
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
            top_keyword_count: DEFAULT_TOP_KEYWORD_COUNT,
            stop_words,
            topic_terms: query_terms(DEFAULT_QUERY).into_iter().collect(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_env() -> TrendResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup. Unset and
    /// blank variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> TrendResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key =
            get("NEWS_API_KEY").ok_or_else(|| TrendError::MissingEnvVar("NEWS_API_KEY".to_string()))?;
        let mut config = Self::new(api_key)?;

        if let Some(endpoint) = get("NEWS_API_ENDPOINT") {
            config = config.with_endpoint(&endpoint);
        }
        if let Some(query) = get("NEWS_QUERY") {
            config = config.with_query(&query);
        }
        // An explicitly empty language disables the filter
        if let Some(language) = lookup("NEWS_LANGUAGE") {
            config = config.with_language(Some(language.trim()));
        }
        if let Some(sort_by) = get("NEWS_SORT_BY") {
            config = config.with_sort_order(sort_by.parse()?);
        }
        if let Some(path) = get("NEWS_OUTPUT_PATH") {
            config = config.with_output_path(path);
        }
        if let Some(count) = parse_var(&get, "NEWS_TARGET_COUNT")? {
            config = config.with_target_count(count);
        }
        if let Some(size) = parse_var(&get, "NEWS_CANDIDATE_POOL_SIZE")? {
            config = config.with_candidate_pool_size(size);
        }
        if let Some(size) = parse_var(&get, "NEWS_TREND_POOL_SIZE")? {
            config = config.with_trend_pool_size(size);
        }
        if let Some(days) = parse_var(&get, "NEWS_TREND_WINDOW_DAYS")? {
            config = config.with_trend_window_days(days);
        }
        if let Some(count) = parse_var(&get, "NEWS_TOP_KEYWORDS")? {
            config = config.with_top_keyword_count(count);
        }
        if let Some(extra) = get("NEWS_EXTRA_STOP_WORDS") {
            config = config.with_stop_words(extra.split(','));
        }
        if let Some(secs) = parse_var::<u64, _>(&get, "NEWS_HTTP_TIMEOUT_SECS")? {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim().to_string();
        self
    }

    /// Replace the search query and, with it, the topic terms.
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.trim().to_string();
        self.topic_terms = query_terms(query).into_iter().collect();
        self
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_target_count(mut self, count: usize) -> Self {
        self.target_count = count;
        self
    }

    pub fn with_candidate_pool_size(mut self, size: u32) -> Self {
        self.candidate_pool_size = size;
        self
    }

    pub fn with_trend_pool_size(mut self, size: u32) -> Self {
        self.trend_pool_size = size;
        self
    }

    pub fn with_trend_window_days(mut self, days: u32) -> Self {
        self.trend_window_days = days;
        self
    }

    pub fn with_top_keyword_count(mut self, count: usize) -> Self {
        self.top_keyword_count = count;
        self
    }

    /// Add stop words (lower-cased, blanks ignored).
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> TrendResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(TrendError::MissingEnvVar("NEWS_API_KEY".to_string()));
        }

        let endpoint =
            Url::parse(&self.endpoint).map_err(|e| TrendError::InvalidUrl(format!("{}: {}", self.endpoint, e)))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(TrendError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.endpoint
            )));
        }

        if self.query.trim().is_empty() {
            return Err(TrendError::Config("Search query must not be empty".to_string()));
        }
        if self.target_count == 0 {
            return Err(TrendError::Config("Target count must be at least 1".to_string()));
        }
        for (name, size) in [
            ("Candidate pool size", self.candidate_pool_size),
            ("Trend pool size", self.trend_pool_size),
        ] {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(TrendError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_PAGE_SIZE, size
                )));
            }
        }
        if self.trend_window_days == 0 {
            return Err(TrendError::Config("Trend window must span at least 1 day".to_string()));
        }
        if self.top_keyword_count == 0 {
            return Err(TrendError::Config("Top keyword count must be at least 1".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(TrendError::Config(
                "HTTP timeout must be at least 1 second".to_string(),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(TrendError::Config("Output path must not be empty".to_string()));
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("query", &self.query)
            .field("language", &self.language)
            .field("sort_order", &self.sort_order)
            .field("output_path", &self.output_path)
            .field("target_count", &self.target_count)
            .field("candidate_pool_size", &self.candidate_pool_size)
            .field("trend_pool_size", &self.trend_pool_size)
            .field("trend_window_days", &self.trend_window_days)
            .field("top_keyword_count", &self.top_keyword_count)
            .field("stop_words", &self.stop_words.len())
            .field("topic_terms", &self.topic_terms)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Individual search terms of a NewsAPI query, lower-cased, without the
/// boolean operators and quoting.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|t| !matches!(*t, "OR" | "AND" | "NOT"))
        .map(|t| {
            t.trim_matches(|c: char| matches!(c, '"' | '(' | ')' | '+' | '-'))
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_var<T, G>(get: &G, name: &str) -> TrendResult<Option<T>>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            TrendError::Config(format!("{} must be a non-negative integer, got {:?}", name, raw))
        }),
    }
}
