use std::{path::PathBuf, time::Duration};

/// Settings for talking to the Clea backend and remembering who is logged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The server's base URL, e.g. `https://example.com`.
    pub api_url: String,
    pub user_agent: String,
    /// Give up on requests which take longer than this.
    pub timeout: Option<Duration>,
    /// Where a [`crate::FileStore`] should keep the credentials.
    pub store_path: PathBuf,
}

impl Config {
    pub const DEFAULT_STORE_PATH: &'static str = ".clea-session.json";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new<S: Into<String>>(api_url: S) -> Self {
        Config {
            api_url: api_url.into(),
            ..Config::default()
        }
    }

    pub fn with_store_path<P: Into<PathBuf>>(self, store_path: P) -> Self {
        Config {
            store_path: store_path.into(),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Option<Duration>) -> Self {
        Config { timeout, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: String::from(crate::DEFAULT_API_URL),
            user_agent: String::from(crate::DEFAULT_USER_AGENT),
            timeout: Some(Config::DEFAULT_TIMEOUT),
            store_path: PathBuf::from(Config::DEFAULT_STORE_PATH),
        }
    }
}
