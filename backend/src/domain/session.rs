//! Whose records the services operate on. A configured user ID scopes all
//! storage paths; without one the process runs as a fresh anonymous user,
//! the same way the original signed visitors in anonymously.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// Session for an anonymous user. The generated ID lives only as long
    /// as the process, so a restart starts from an empty store.
    pub fn anonymous() -> Self {
        Self {
            user_id: format!("user::{}", Uuid::new_v4()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_user_id_kept() {
        let session = Session::new("user::family");
        assert_eq!(session.user_id(), "user::family");
    }

    #[test]
    fn test_anonymous_sessions_distinct() {
        let first = Session::anonymous();
        let second = Session::anonymous();

        assert!(first.user_id().starts_with("user::"));
        assert_ne!(first.user_id(), second.user_id());
    }
}
