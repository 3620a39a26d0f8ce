use anyhow::Context;
use std::fmt;

use crate::Result;

/// Environment variable holding the proxy username
pub const PROXY_USERNAME_VAR: &str = "PROXY_UNAME";

/// Environment variable holding the proxy password
pub const PROXY_PASSWORD_VAR: &str = "PROXY_PASS";

/// Environment variable overriding the proxy host
pub const PROXY_HOST_VAR: &str = "PROXY_HOST";

/// Environment variable overriding the proxy port
pub const PROXY_PORT_VAR: &str = "PROXY_PORT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Rotating proxy used for every request to YouTube
    pub proxy: ProxyConfig,

    /// HTTP client settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy account credentials
    pub credentials: ProxyCredentials,

    /// Proxy host name
    pub host: String,

    /// Proxy port
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Value sent as `Accept-Language`, pins caption names to English
    pub accept_language: String,

    /// User agent for page and caption requests
    pub user_agent: String,
}

/// Proxy username and password. Never printed: `Debug` redacts the password
/// and there is no `Display` impl.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProxyCredentials {
    username: String,
    password: String,
}

impl ProxyCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// An empty username means requests go out without a proxy
    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
    }
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username_set", &!self.username.is_empty())
            .field("password_set", &!self.password.is_empty())
            .finish()
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            credentials: ProxyCredentials::default(),
            host: "p.webshare.io".to_string(),
            port: 80,
        }
    }
}

impl ProxyConfig {
    /// Whether a proxy should be configured at all
    pub fn is_enabled(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Proxy URL without credentials; they are attached separately
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Username with the suffix that asks for a fresh exit IP per request
    pub fn rotating_username(&self) -> String {
        format!("{}-rotate", self.credentials.username())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            accept_language: "en-US".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.proxy.credentials = ProxyCredentials::new(
            lookup(PROXY_USERNAME_VAR).unwrap_or_default(),
            lookup(PROXY_PASSWORD_VAR).unwrap_or_default(),
        );

        if let Some(host) = lookup(PROXY_HOST_VAR).filter(|h| !h.trim().is_empty()) {
            config.proxy.host = host.trim().to_string();
        }

        if let Some(port) = lookup(PROXY_PORT_VAR).filter(|p| !p.trim().is_empty()) {
            config.proxy.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got {:?}", PROXY_PORT_VAR, port))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.proxy.is_enabled() && self.proxy.port == 0 {
            anyhow::bail!("Proxy port must be non-zero when credentials are set");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        if self.proxy.is_enabled() {
            println!("  Proxy: {}", self.proxy.url());
            println!("  Proxy credentials: set");
        } else {
            println!("  Proxy: none (direct connection)");
        }
        println!("  Accept-Language: {}", self.http.accept_language);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_credentials_default_to_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.proxy.credentials.username(), "");
        assert_eq!(config.proxy.credentials.password(), "");
        assert!(!config.proxy.is_enabled());
    }

    #[test]
    fn test_credentials_from_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROXY_UNAME", "alice"),
            ("PROXY_PASS", "s3cret"),
        ]))
        .unwrap();
        assert!(config.proxy.is_enabled());
        assert_eq!(config.proxy.rotating_username(), "alice-rotate");
        assert_eq!(config.proxy.url(), "http://p.webshare.io:80");
    }

    #[test]
    fn test_host_and_port_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROXY_UNAME", "alice"),
            ("PROXY_HOST", "proxy.internal"),
            ("PROXY_PORT", "3128"),
        ]))
        .unwrap();
        assert_eq!(config.proxy.url(), "http://proxy.internal:3128");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PROXY_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PROXY_PORT"));
    }

    #[test]
    fn test_zero_port_rejected_only_with_proxy() {
        assert!(Config::from_lookup(lookup_from(&[("PROXY_PORT", "0")])).is_ok());
        assert!(Config::from_lookup(lookup_from(&[("PROXY_UNAME", "alice"), ("PROXY_PORT", "0")])).is_err());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROXY_UNAME", "alice"),
            ("PROXY_PASS", "s3cret"),
        ]))
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("username_set: true"));
        assert!(rendered.contains("password_set: true"));
    }
}
