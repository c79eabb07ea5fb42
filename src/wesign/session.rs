//! Session token storage.

use std::fmt;

/// Tokens for an authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Bearer token attached to every authenticated request.
    pub access_token: String,
    /// Token exchanged for a new access token on 401.
    pub refresh_token: String,
    /// Secondary token echoed back on refresh when issued.
    pub auth_token: Option<String>,
}

impl SessionTokens {
    /// True when a refresh can be attempted.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_tokens() {
        let tokens = SessionTokens {
            access_token: "eyJ.access".to_string(),
            refresh_token: "refresh-123".to_string(),
            auth_token: Some("auth-456".to_string()),
        };
        let debug = format!("{tokens:?}");
        assert!(!debug.contains("eyJ.access"));
        assert!(!debug.contains("refresh-123"));
        assert!(!debug.contains("auth-456"));
    }

    #[test]
    fn empty_refresh_token_cannot_refresh() {
        let tokens = SessionTokens {
            access_token: "a".to_string(),
            refresh_token: String::new(),
            auth_token: None,
        };
        assert!(!tokens.can_refresh());
    }
}
