pub mod domain;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod render;
pub mod service;
pub mod session;
pub mod store;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
    const DEFAULT_PROCESS_DATES_PATH: &str = "/process_dates";
    const DEFAULT_PREDICT_PATH: &str = "/predict_api";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_MAX_RANGE_DAYS: u32 = 5;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub base_url: Option<String>,
        pub process_dates_path: String,
        pub predict_path: String,
        pub request_timeout_secs: u64,
        /// Inclusive day limit for one prediction run. `None` disables the check.
        pub max_range_days: Option<u32>,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                base_url: None,
                process_dates_path: DEFAULT_PROCESS_DATES_PATH.to_string(),
                predict_path: DEFAULT_PREDICT_PATH.to_string(),
                request_timeout_secs: DEFAULT_TIMEOUT_SECS,
                max_range_days: Some(DEFAULT_MAX_RANGE_DAYS),
                sentry_dsn: None,
                port: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let request_timeout_secs = match std::env::var("REQUEST_TIMEOUT_SECS") {
                Ok(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {s}"))?,
                Err(_) => defaults.request_timeout_secs,
            };

            // MAX_RANGE_DAYS=0 turns the limit off.
            let max_range_days = match std::env::var("MAX_RANGE_DAYS") {
                Ok(s) => {
                    let n = s
                        .trim()
                        .parse::<u32>()
                        .with_context(|| format!("MAX_RANGE_DAYS is not a number: {s}"))?;
                    (n != 0).then_some(n)
                }
                Err(_) => defaults.max_range_days,
            };

            Ok(Self {
                base_url: std::env::var("FISHCAST_BASE_URL").ok(),
                process_dates_path: non_empty_var("PROCESS_DATES_PATH")
                    .unwrap_or(defaults.process_dates_path),
                predict_path: non_empty_var("PREDICT_PATH").unwrap_or(defaults.predict_path),
                request_timeout_secs,
                max_range_days,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()),
            })
        }

        pub fn base_url(&self) -> &str {
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

}
