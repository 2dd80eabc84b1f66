use crate::application::aggregate::AggregatePolicy;
use crate::application::collect_sentiment::CollectSettings;
use crate::application::paginate::PageLimits;
use crate::application::retry::RetryPolicy;
use crate::domain::error::DomainError;
use crate::domain::values::time_window::ONE_DAY;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "SentimentJester/1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    Lexicon,
    Ollama,
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicon" => Ok(Self::Lexicon),
            "ollama" | "llm" => Ok(Self::Ollama),
            _ => Err(format!("Unknown scorer: {s}")),
        }
    }
}

/// Script-app credentials for Reddit's password grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct JesterConfig {
    pub db_path: String,
    pub debug: bool,
    pub day_length: i64,
    pub page_size: u32,
    pub max_pages: Option<usize>,
    pub max_items: Option<usize>,
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub aggregate: AggregatePolicy,
    pub scorer: ScorerKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub reddit: Option<RedditCredentials>,
    pub x_bearer_token: Option<String>,
    pub youtube_key: Option<String>,
    pub user_agent: String,
}

impl Default for JesterConfig {
    fn default() -> Self {
        Self {
            db_path: "./jester.db".into(),
            debug: false,
            day_length: ONE_DAY,
            page_size: 25,
            max_pages: None,
            max_items: None,
            concurrency: 8,
            max_retries: 5,
            retry_base_ms: 1000,
            aggregate: AggregatePolicy::Mean,
            scorer: ScorerKind::Lexicon,
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "deepseek-r1:1.5b".into(),
            reddit: None,
            x_bearer_token: None,
            youtube_key: None,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl JesterConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        fn parse<T: FromStr>(var: &str, raw: Option<String>) -> Result<Option<T>, DomainError>
        where
            T::Err: std::fmt::Display,
        {
            raw.map(|v| {
                v.parse::<T>()
                    .map_err(|e| DomainError::Config(format!("{var}={v}: {e}")))
            })
            .transpose()
        }

        let defaults = Self::default();

        let debug = get("DEBUG_MODE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let reddit = match (
            get("REDDIT_CLIENT_ID"),
            get("REDDIT_CLIENT_SECRET"),
            get("REDDIT_USERNAME"),
            get("REDDIT_PASSWORD"),
        ) {
            (Some(client_id), Some(client_secret), Some(username), Some(password)) => Some(RedditCredentials {
                client_id,
                client_secret,
                username,
                password,
            }),
            _ => None,
        };

        let concurrency: usize = parse("JESTER_CONCURRENCY", get("JESTER_CONCURRENCY"))?.unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            return Err(DomainError::Config("JESTER_CONCURRENCY must be positive".into()));
        }
        let page_size: u32 = parse("JESTER_PAGE_SIZE", get("JESTER_PAGE_SIZE"))?.unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(DomainError::Config("JESTER_PAGE_SIZE must be positive".into()));
        }

        let aggregate = get("JESTER_AGGREGATE")
            .map(|v| v.parse::<AggregatePolicy>().map_err(DomainError::Config))
            .transpose()?
            .unwrap_or(defaults.aggregate);
        let scorer = get("JESTER_SCORER")
            .map(|v| v.parse::<ScorerKind>().map_err(DomainError::Config))
            .transpose()?
            .unwrap_or(defaults.scorer);

        Ok(Self {
            db_path: get("JESTER_DB").unwrap_or(defaults.db_path),
            debug,
            day_length: parse("JESTER_DAY_LENGTH", get("JESTER_DAY_LENGTH"))?.unwrap_or(defaults.day_length),
            page_size,
            max_pages: parse("JESTER_MAX_PAGES", get("JESTER_MAX_PAGES"))?,
            max_items: parse("JESTER_MAX_ITEMS", get("JESTER_MAX_ITEMS"))?,
            concurrency,
            max_retries: parse("JESTER_MAX_RETRIES", get("JESTER_MAX_RETRIES"))?.unwrap_or(defaults.max_retries),
            retry_base_ms: parse("JESTER_RETRY_BASE_MS", get("JESTER_RETRY_BASE_MS"))?.unwrap_or(defaults.retry_base_ms),
            aggregate,
            scorer,
            ollama_url: get("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            reddit,
            x_bearer_token: get("X_BEARER_TOKEN"),
            youtube_key: get("YT_KEY"),
            user_agent: get("JESTER_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_ms),
            max_delay: Duration::from_secs(60),
        }
    }

    pub fn collect_settings(&self) -> CollectSettings {
        CollectSettings {
            limits: PageLimits {
                max_pages: self.max_pages,
                max_items: self.max_items,
            },
            retry: self.retry_policy(),
            concurrency: self.concurrency,
            aggregate: self.aggregate,
            debug: self.debug,
        }
    }
}
