//! Access-token sources for the signed-in identity.

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Supplies the bearer token for the current identity. The client only
/// reads from it; ownership and refresh belong to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// The current access token, or `None` when signed out.
    async fn access_token(&self) -> Option<String>;

    /// Called once after the server rejects the access token with 401.
    /// Returns the replacement token, or `None` if the source cannot refresh.
    async fn refresh_access_token(&self) -> Option<String> {
        None
    }
}

/// No identity: every request goes out without an Authorization header.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

#[async_trait]
impl SessionSource for AnonymousSession {
    async fn access_token(&self) -> Option<String> {
        None
    }
}

/// A token held in memory, replaceable after sign-in or sign-out.
#[derive(Debug, Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        }
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token.filter(|t| !t.is_empty());
    }
}

#[async_trait]
impl SessionSource for StaticSession {
    async fn access_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

/// Shortens a token for log output, e.g. `eyJhbGci*********x9Qw`.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_session_has_no_token() {
        assert_eq!(AnonymousSession.access_token().await, None);
        assert_eq!(AnonymousSession.refresh_access_token().await, None);
    }

    #[tokio::test]
    async fn test_static_session_set_and_clear() {
        let session = StaticSession::new(Some("tok".to_string()));
        assert_eq!(session.access_token().await.as_deref(), Some("tok"));

        session.set_token(None).await;
        assert_eq!(session.access_token().await, None);

        session.set_token(Some(String::new())).await;
        assert_eq!(session.access_token().await, None);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefghijklmnop"), "abcdefgh*********mnop");
        assert_eq!(mask_token("short"), "*****");
    }
}
