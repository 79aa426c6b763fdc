//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the client and session
//! layers. Nothing below reads environment variables itself; binaries collect the raw values and
//! hand them to the parsing helpers here.

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_MS, SESSION_FILENAME,
};
use crate::{FilingError, FilingResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct FilingConfig {
    api_base_url: String,
    timeout: Duration,
    session_file: PathBuf,
}

impl FilingConfig {
    /// Create a new `FilingConfig`.
    ///
    /// The base URL must be an `http` or `https` URL; a trailing `/` is dropped so endpoint paths
    /// can be appended directly. The timeout must be non-zero.
    pub fn new(
        api_base_url: impl Into<String>,
        timeout: Duration,
        session_file: PathBuf,
    ) -> FilingResult<Self> {
        let api_base_url = api_base_url.into().trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(FilingError::InvalidConfig(format!(
                "api base url must start with http:// or https://, got {api_base_url:?}"
            )));
        }
        if timeout.is_zero() {
            return Err(FilingError::InvalidConfig("timeout cannot be zero".into()));
        }

        Ok(Self {
            api_base_url,
            timeout,
            session_file,
        })
    }

    /// Build a configuration from optional raw values, applying defaults for missing ones.
    ///
    /// # Arguments
    ///
    /// * `base_url` - value of `FILING_API_BASE_URL`
    /// * `timeout_ms` - value of `FILING_API_TIMEOUT_MS`
    /// * `session_file` - value of `FILING_SESSION_FILE`
    /// * `home` - the user's home directory, used for the default session path
    ///
    /// # Errors
    ///
    /// Returns [`FilingError::InvalidConfig`] if a value is malformed or no session path can be
    /// derived.
    pub fn from_values(
        base_url: Option<String>,
        timeout_ms: Option<String>,
        session_file: Option<String>,
        home: Option<PathBuf>,
    ) -> FilingResult<Self> {
        let base_url = non_blank(base_url).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let timeout = timeout_from_env_value(timeout_ms)?;
        let session_file = resolve_session_file(non_blank(session_file).map(PathBuf::from), home)?;
        Self::new(base_url, timeout, session_file)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a timeout in milliseconds, defaulting to [`DEFAULT_TIMEOUT_MS`].
pub fn timeout_from_env_value(value: Option<String>) -> FilingResult<Duration> {
    let millis = match non_blank(value) {
        Some(raw) => raw.parse::<u64>().map_err(|e| {
            FilingError::InvalidConfig(format!("invalid timeout {raw:?}: {e}"))
        })?,
        None => DEFAULT_TIMEOUT_MS,
    };
    Ok(Duration::from_millis(millis))
}

/// Resolve where the session is persisted.
///
/// An explicit override wins; otherwise the file lives under `<home>/.config/filing/`.
pub fn resolve_session_file(
    override_file: Option<PathBuf>,
    home: Option<PathBuf>,
) -> FilingResult<PathBuf> {
    if let Some(path) = override_file {
        return Ok(path);
    }
    home.map(|home| home.join(CONFIG_DIR_NAME).join(SESSION_FILENAME))
        .ok_or_else(|| {
            FilingError::InvalidConfig(
                "HOME is not set and FILING_SESSION_FILE was not provided".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_defaults() {
        let cfg = FilingConfig::from_values(None, None, None, Some(PathBuf::from("/home/a")))
            .expect("default config");
        assert_eq!(cfg.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(
            cfg.session_file(),
            Path::new("/home/a/.config/filing/session.json")
        );
    }

    #[test]
    fn overrides_win_and_trailing_slash_is_dropped() {
        let cfg = FilingConfig::from_values(
            Some("https://filing.example.org/ ".into()),
            Some("1500".into()),
            Some("/tmp/s.json".into()),
            None,
        )
        .expect("config");
        assert_eq!(cfg.api_base_url(), "https://filing.example.org");
        assert_eq!(cfg.timeout(), Duration::from_millis(1500));
        assert_eq!(cfg.session_file(), Path::new("/tmp/s.json"));
    }

    #[test]
    fn rejects_bad_values() {
        let home = Some(PathBuf::from("/home/a"));
        assert!(FilingConfig::from_values(Some("ftp://x".into()), None, None, home.clone()).is_err());
        assert!(FilingConfig::from_values(None, Some("soon".into()), None, home.clone()).is_err());
        assert!(FilingConfig::from_values(None, Some("0".into()), None, home).is_err());
        assert!(FilingConfig::from_values(None, None, None, None).is_err());
    }
}
