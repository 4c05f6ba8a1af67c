//! Authentication configuration
//!
//! Affinity exposes two authentication schemes: the v2 API takes a bearer
//! token, the v1 API takes HTTP basic auth with an empty username and the
//! API key as the password. Both are applied per-request; there is no token
//! refresh lifecycle.

use reqwest::RequestBuilder;

/// Authentication configuration applied to outgoing requests
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication
    #[default]
    None,

    /// Bearer token authentication (Affinity v2)
    Bearer {
        /// The bearer token
        token: String,
    },

    /// HTTP Basic authentication (Affinity v1)
    Basic {
        /// Username (empty for Affinity)
        username: String,
        /// Password
        password: String,
    },
}

impl AuthConfig {
    /// Bearer auth with the given API key
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Basic auth with an empty username, as the Affinity v1 API expects
    pub fn basic_api_key(api_key: impl Into<String>) -> Self {
        Self::Basic {
            username: String::new(),
            password: api_key.into(),
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            AuthConfig::None => req,
            AuthConfig::Bearer { token } => req.bearer_auth(token),
            AuthConfig::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_constructor() {
        let auth = AuthConfig::bearer("secret");
        match auth {
            AuthConfig::Bearer { token } => assert_eq!(token, "secret"),
            _ => panic!("Expected Bearer"),
        }
    }

    #[test]
    fn test_basic_api_key_has_empty_username() {
        let auth = AuthConfig::basic_api_key("secret");
        match auth {
            AuthConfig::Basic { username, password } => {
                assert_eq!(username, "");
                assert_eq!(password, "secret");
            }
            _ => panic!("Expected Basic"),
        }
    }

    #[test]
    fn test_default_is_none() {
        assert!(matches!(AuthConfig::default(), AuthConfig::None));
    }
}
