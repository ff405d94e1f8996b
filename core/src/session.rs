use tracing::warn;

use crate::credential::CredentialStore;
use crate::errors::ClientResult;

/// Which view the front-end is showing; derived from the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Anonymous,
    Authenticated,
}

/// The credential plus its durable slot, owned by the application root.
///
/// The view state is computed from the in-memory token, so a non-empty
/// credential and the authenticated view can never disagree.
pub struct Session {
    store: Box<dyn CredentialStore>,
    token: Option<String>,
}

impl Session {
    /// Restores a previously persisted credential, if any.
    ///
    /// An unreadable slot starts the session anonymous.
    pub fn restore(store: Box<dyn CredentialStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Ignoring stored credential: {}", e);
                None
            }
        };
        Self { store, token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn auth_view(&self) -> AuthView {
        if self.is_authenticated() {
            AuthView::Authenticated
        } else {
            AuthView::Anonymous
        }
    }

    /// Persists then adopts a freshly issued credential. Nothing changes if persisting fails.
    pub(crate) fn establish(&mut self, token: String) -> ClientResult<()> {
        self.store.save(&token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Drops the credential from the durable slot, then from memory.
    /// If clearing fails the session stays authenticated.
    pub(crate) fn end(&mut self) -> ClientResult<()> {
        self.store.clear()?;
        self.token = None;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("auth_view", &self.auth_view())
            .finish_non_exhaustive()
    }
}
