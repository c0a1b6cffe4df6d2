// Process-wide configuration, read once per invocation.
//
// Credentials come pre-obtained from the environment (optionally seeded from
// a `.env` file in the working directory). Nothing here validates them; a
// wrong or missing value is rejected by the remote API.

use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://secure.splitwise.com/api/v3.0";

pub const ENV_CSRF_TOKEN: &str = "X_CSRF_TOKEN";
pub const ENV_USER_CREDENTIALS: &str = "USER_CREDENTIALS";
pub const ENV_DEVICE_ID: &str = "SWDID";
pub const ENV_SESSION: &str = "SPLITWISE_SESSION";
pub const ENV_API_URL: &str = "SPLITWISE_API_URL";
pub const ENV_STRICT_EXIT: &str = "SPLITWISE_STRICT_EXIT";

/// Anti-forgery token plus the three session cookies attached to every call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub csrf_token: String,
    pub user_credentials: String,
    pub device_id: String,
    pub session_id: String,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext").finish_non_exhaustive()
    }
}

impl AuthContext {
    /// Build the context from any variable lookup. Unset variables become
    /// empty strings.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        AuthContext {
            csrf_token: get(ENV_CSRF_TOKEN),
            user_credentials: get(ENV_USER_CREDENTIALS),
            device_id: get(ENV_DEVICE_ID),
            session_id: get(ENV_SESSION),
        }
    }

    /// The `Cookie` header value: the three credentials joined by `; `.
    pub fn cookie_header(&self) -> String {
        format!(
            "user_credentials={}; swdid={}; _splitwise_session={}",
            self.user_credentials, self.device_id, self.session_id
        )
    }
}

/// How logical API failures and request failures map onto the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Exit 0 once the request was attempted, whatever the API said.
    #[default]
    Lenient,
    /// Exit 1 when the API reported an error or the request failed.
    Strict,
}

/// Everything a program needs besides its flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub auth: AuthContext,
    pub exit_policy: ExitPolicy,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => debug!(error = %e, "ignoring unreadable .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let exit_policy = match lookup(ENV_STRICT_EXIT).as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => ExitPolicy::Strict,
            _ => ExitPolicy::Lenient,
        };
        Settings {
            api_url,
            auth: AuthContext::from_lookup(&lookup),
            exit_policy,
        }
    }
}
