//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Secrets never live in the TOML: the cookie signing key comes from
//! COOKIE_SECRET or `[cookies] secret_file`, and the optional OIDC client
//! secret from OIDC_CLIENT_SECRET or `[provider] client_secret_file`.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Minimum length of the cookie signing key. A short HMAC key makes the
/// signed cookies brute-forceable, which would defeat the only session
/// integrity mechanism this design has.
const MIN_COOKIE_SECRET_BYTES: usize = 32;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Externally visible base URL; the callback redirect URI is derived
    /// from it and the `Secure` cookie attribute follows its scheme.
    pub public_url: String,
}

/// Identity-provider endpoints and client identity.
/// Endpoints are configured statically; OIDC discovery is out of scope.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to the
    /// OIDC_CLIENT_SECRET env var). Optional: PKCE public clients need none.
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    #[serde(default)]
    pub revocation_endpoint: Option<String>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Cookie codec settings
#[derive(Debug, Deserialize)]
pub struct CookieConfig {
    #[serde(skip)]
    pub secret: Option<Secret<String>>,
    /// Path to a file containing the signing key (alternative to the
    /// COOKIE_SECRET env var)
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: u64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secret_file: None,
            state_ttl_secs: default_state_ttl(),
        }
    }
}

fn default_scopes() -> String {
    "openid email profile".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_state_ttl() -> u64 {
    rp_session::DEFAULT_STATE_TTL_SECS
}

fn require_http_url(name: &str, value: &str) -> common::Result<()> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(common::Error::Config(format!(
            "{name} must start with http:// or https://, got: {value}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    ///
    /// Secret resolution order (each): env var, then the configured file.
    /// The cookie secret is mandatory; the client secret is not.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        require_http_url("public_url", &config.server.public_url)?;
        require_http_url(
            "authorization_endpoint",
            &config.provider.authorization_endpoint,
        )?;
        require_http_url("token_endpoint", &config.provider.token_endpoint)?;
        require_http_url("userinfo_endpoint", &config.provider.userinfo_endpoint)?;
        if let Some(url) = &config.provider.revocation_endpoint {
            require_http_url("revocation_endpoint", url)?;
        }
        if let Some(url) = &config.provider.end_session_endpoint {
            require_http_url("end_session_endpoint", url)?;
        }

        if config.provider.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if config.cookies.state_ttl_secs == 0 {
            return Err(common::Error::Config(
                "state_ttl_secs must be greater than 0".into(),
            ));
        }

        config.cookies.secret = Some(resolve_secret(
            "COOKIE_SECRET",
            config.cookies.secret_file.as_deref(),
        )?
        .ok_or_else(|| {
            common::Error::Secret(
                "cookie signing key missing: set COOKIE_SECRET or [cookies] secret_file".into(),
            )
        })?);

        if config
            .cookies
            .secret
            .as_ref()
            .is_some_and(|s| s.expose().len() < MIN_COOKIE_SECRET_BYTES)
        {
            return Err(common::Error::Secret(format!(
                "cookie signing key must be at least {MIN_COOKIE_SECRET_BYTES} bytes"
            )));
        }

        config.provider.client_secret = resolve_secret(
            "OIDC_CLIENT_SECRET",
            config.provider.client_secret_file.as_deref(),
        )?;

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("rp-gateway.toml")
    }

    /// Canonical callback URL registered with the provider. The same value
    /// is sent in the authorization request and at token exchange.
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}/auth/callback",
            self.server.public_url.trim_end_matches('/')
        )
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.server.public_url.starts_with("https://")
    }
}

/// Read a secret from an env var, falling back to a file path.
fn resolve_secret(env_var: &str, file: Option<&Path>) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    if let Some(path) = file {
        let value = std::fs::read_to_string(path).map_err(|e| {
            common::Error::Secret(format!("failed to read {}: {e}", path.display()))
        })?;
        let value = value.trim().to_owned();
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn valid_toml() -> &'static str {
        r#"
[server]
listen_addr = "127.0.0.1:8080"
public_url = "https://app.example.com"

[provider]
client_id = "rp-gateway"
authorization_endpoint = "https://idp.example.com/authorize"
token_endpoint = "https://idp.example.com/token"
userinfo_endpoint = "https://idp.example.com/userinfo"
"#
    }

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_valid_config_with_env_secret() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), valid_toml());

        unsafe { set_env("COOKIE_SECRET", "0123456789abcdef0123456789abcdef") };
        unsafe { remove_env("OIDC_CLIENT_SECRET") };

        let config = Config::load(&path).unwrap();
        assert_eq!(config.provider.client_id, "rp-gateway");
        assert_eq!(config.provider.scopes, "openid email profile");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.cookies.state_ttl_secs, 600);
        assert!(config.provider.client_secret.is_none());
        assert_eq!(config.redirect_uri(), "https://app.example.com/auth/callback");
        assert!(config.secure_cookies());

        unsafe { remove_env("COOKIE_SECRET") };
    }

    #[test]
    fn missing_cookie_secret_is_an_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), valid_toml());

        unsafe { remove_env("COOKIE_SECRET") };

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Secret(_))));
    }

    #[test]
    fn short_cookie_secret_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), valid_toml());

        unsafe { set_env("COOKIE_SECRET", "too-short") };

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Secret(_))));

        unsafe { remove_env("COOKIE_SECRET") };
    }

    #[test]
    fn secrets_load_from_files() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cookie_key = dir.path().join("cookie.key");
        let client_secret = dir.path().join("client.secret");
        std::fs::write(&cookie_key, "0123456789abcdef0123456789abcdef\n").unwrap();
        std::fs::write(&client_secret, "s3cret\n").unwrap();

        let toml = format!(
            "{}client_secret_file = \"{}\"\n\n[cookies]\nsecret_file = \"{}\"\n",
            valid_toml(),
            client_secret.display(),
            cookie_key.display()
        );
        let path = write_config(dir.path(), &toml);

        unsafe { remove_env("COOKIE_SECRET") };
        unsafe { remove_env("OIDC_CLIENT_SECRET") };

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.cookies.secret.as_ref().unwrap().expose(),
            "0123456789abcdef0123456789abcdef"
        );
        assert_eq!(
            config.provider.client_secret.as_ref().unwrap().expose(),
            "s3cret"
        );
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let toml = valid_toml().replace(
            "https://idp.example.com/token",
            "ftp://idp.example.com/token",
        );
        let path = write_config(dir.path(), &toml);

        unsafe { set_env("COOKIE_SECRET", "0123456789abcdef0123456789abcdef") };

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Config(_))));

        unsafe { remove_env("COOKIE_SECRET") };
    }

    #[test]
    fn zero_state_ttl_is_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let toml = format!("{}\n[cookies]\nstate_ttl_secs = 0\n", valid_toml());
        let path = write_config(dir.path(), &toml);

        unsafe { set_env("COOKIE_SECRET", "0123456789abcdef0123456789abcdef") };

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Config(_))));

        unsafe { remove_env("COOKIE_SECRET") };
    }

    #[test]
    fn load_missing_file_fails() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn resolve_path_prefers_cli() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/from/env.toml") };
        assert_eq!(
            Config::resolve_path(Some("/from/cli.toml")),
            PathBuf::from("/from/cli.toml")
        );
        assert_eq!(
            Config::resolve_path(None),
            PathBuf::from("/from/env.toml")
        );
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(Config::resolve_path(None), PathBuf::from("rp-gateway.toml"));
    }

    #[test]
    fn redirect_uri_handles_trailing_slash() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let toml = valid_toml().replace(
            "https://app.example.com",
            "http://localhost:8080/",
        );
        let path = write_config(dir.path(), &toml);

        unsafe { set_env("COOKIE_SECRET", "0123456789abcdef0123456789abcdef") };

        let config = Config::load(&path).unwrap();
        assert_eq!(config.redirect_uri(), "http://localhost:8080/auth/callback");
        assert!(!config.secure_cookies());

        unsafe { remove_env("COOKIE_SECRET") };
    }
}
