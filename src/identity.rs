use std::sync::RwLock;

/// Boundary to the authentication provider: a stable user id, available
/// synchronously once the actor is signed in. `end()` is a no-op without it.
pub trait IdentityProvider: Send + Sync + 'static {
    fn current_user_id(&self) -> Option<String>;
}

/// Identity held in memory, flipped by `sign_in`/`sign_out`. Enough for the
/// demo binary and tests; a real frontend plugs its auth session in here.
#[derive(Default)]
pub struct StaticIdentity {
    user_id: RwLock<Option<String>>,
}

impl StaticIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        let mut guard = match self.user_id.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        let mut guard = match self.user_id.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        let guard = match self.user_id.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_identity_tracks_sign_in_and_out() {
        let identity = StaticIdentity::signed_out();
        assert_eq!(identity.current_user_id(), None);

        identity.sign_in("user-1");
        assert_eq!(identity.current_user_id().as_deref(), Some("user-1"));

        identity.sign_out();
        assert_eq!(identity.current_user_id(), None);
    }
}
