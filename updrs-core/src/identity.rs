//! Current-user identity, abstracted away from any concrete auth system.
//!
//! Session management lives entirely in an external identity provider; the
//! pipeline only ever asks "who is submitting right now?". Submissions made
//! with no current user are stored without an owner.

use std::sync::Arc;

/// Supplies the current user identifier, if anyone is signed in.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

/// A fixed identity, typically taken from configuration or a test.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id }
    }

    /// An identity with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        self.user_id.clone()
    }
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    fn current_user(&self) -> Option<String> {
        (**self).current_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity::new(Some("clinician-7".into()));
        assert_eq!(identity.current_user().as_deref(), Some("clinician-7"));
    }

    #[test]
    fn test_anonymous_identity() {
        assert_eq!(StaticIdentity::anonymous().current_user(), None);
    }
}
