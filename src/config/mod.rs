use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub langbase: LangbaseConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub pipes: PipeConfig,
    pub agent: AgentConfig,
}

/// Langbase API configuration
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Business data database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration.
///
/// `max_retries` applies to the transport only and defaults to zero, so a
/// failed generation call surfaces immediately unless retries are opted into.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Langbase pipe name configuration
#[derive(Debug, Clone)]
pub struct PipeConfig {
    pub maturity: String,
    pub executive_summary: String,
    pub recommendations: String,
    pub ai_opportunities: String,
    pub agent: String,
}

/// Bounds for a single agent conversation turn
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum number of backend round-trips before giving up.
    pub max_turns: u32,
    /// Wall-clock budget for the whole exchange.
    pub time_budget_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let langbase = LangbaseConfig {
            api_key: env::var("LANGBASE_API_KEY").map_err(|_| AppError::Config {
                message: "LANGBASE_API_KEY is required".to_string(),
            })?,
            base_url: env::var("LANGBASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/business.db".to_string()),
            ),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 30000),
            max_retries: parse_env("MAX_RETRIES", 0),
            retry_delay_ms: parse_env("RETRY_DELAY_MS", 1000),
        };

        let pipes = PipeConfig {
            maturity: env::var("PIPE_MATURITY")
                .unwrap_or_else(|_| "gtm-maturity-v1".to_string()),
            executive_summary: env::var("PIPE_EXECUTIVE_SUMMARY")
                .unwrap_or_else(|_| "gtm-executive-summary-v1".to_string()),
            recommendations: env::var("PIPE_RECOMMENDATIONS")
                .unwrap_or_else(|_| "gtm-recommendations-v1".to_string()),
            ai_opportunities: env::var("PIPE_AI_OPPORTUNITIES")
                .unwrap_or_else(|_| "gtm-ai-opportunities-v1".to_string()),
            agent: env::var("PIPE_AGENT").unwrap_or_else(|_| "business-agent-v1".to_string()),
        };

        let agent = AgentConfig {
            max_turns: parse_env("AGENT_MAX_TURNS", 8),
            time_budget_ms: parse_env("AGENT_TIME_BUDGET_MS", 120_000),
        };

        if agent.max_turns == 0 {
            return Err(AppError::Config {
                message: "AGENT_MAX_TURNS must be at least 1".to_string(),
            });
        }

        if agent.time_budget_ms == 0 {
            return Err(AppError::Config {
                message: "AGENT_TIME_BUDGET_MS must be at least 1".to_string(),
            });
        }

        Ok(Config {
            langbase,
            database,
            logging,
            request,
            pipes,
            agent,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 0,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            maturity: "gtm-maturity-v1".to_string(),
            executive_summary: "gtm-executive-summary-v1".to_string(),
            recommendations: "gtm-recommendations-v1".to_string(),
            ai_opportunities: "gtm-ai-opportunities-v1".to_string(),
            agent: "business-agent-v1".to_string(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: 8,
            time_budget_ms: 120_000,
        }
    }
}

impl AgentConfig {
    /// Time budget as a [`Duration`].
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}
