use crate::{
    endpoints::{self, AuthError, EndpointError, Registered, Registration, Transport},
    store::{CredentialStore, Slot},
    Credentials, User,
};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::OnceCell;

/// Where a [`SessionManager`] is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Previously stored credentials haven't been checked yet.
    Bootstrapping,
    Anonymous,
    Authenticated,
}

/// A successful [`SessionManager::login()`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct LoggedIn {
    pub user: User,
    pub message: Option<String>,
}

/// Owns the logged-in user's identity for the lifetime of the application.
///
/// The user and their token are always held together. Every change goes
/// through here so the [`CredentialStore`] and the in-memory session stay in
/// sync, and the stored copy of the user never contains their avatar.
///
/// Operations are expected to be issued one at a time (e.g. by disabling the
/// login button while a request is in flight). Nothing here stops a caller
/// from racing a `login()` against a `logout()`.
#[derive(Debug)]
pub struct SessionManager<T, S> {
    transport: T,
    store: S,
    credentials: RwLock<Option<Credentials>>,
    bootstrapped: OnceCell<()>,
}

impl<T, S> SessionManager<T, S>
where
    T: Transport,
    S: CredentialStore,
{
    pub fn new(transport: T, store: S) -> Self {
        SessionManager {
            transport,
            store,
            credentials: RwLock::new(None),
            bootstrapped: OnceCell::new(),
        }
    }

    /// Restore a previously stored session, checking with the server that
    /// its token is still valid.
    ///
    /// The check only ever happens once. Later calls (including concurrent
    /// ones) wait for that first check to finish and report the current
    /// state.
    pub async fn bootstrap(&self) -> SessionState {
        self.bootstrapped.get_or_init(|| self.restore()).await;
        self.state()
    }

    async fn restore(&self) {
        let stored = match self.read_stored() {
            Some(stored) => stored,
            None => {
                log::debug!("No stored credentials, starting anonymously");
                return;
            },
        };

        match endpoints::verify_token(&self.transport, &stored.token).await {
            Ok(true) => {
                log::info!("Restored the session for {}", stored.user.email);
                *self.write() = Some(stored);
            },
            Ok(false) => {
                log::info!("The stored token is no longer valid");
                self.clear_store();
            },
            Err(e) => {
                log::error!("Unable to verify the stored token: {}", e);
                self.clear_store();
            },
        }
    }

    fn read_stored(&self) -> Option<Credentials> {
        let token = self.load(Slot::Token)?;
        let user = self.load(Slot::User)?;

        match serde_json::from_str(&user) {
            Ok(user) => Some(Credentials { token, user }),
            Err(e) => {
                log::warn!("Discarding an unreadable stored user: {}", e);
                self.clear_store();
                None
            },
        }
    }

    /// Is the session still waiting on [`SessionManager::bootstrap()`]?
    ///
    /// Nothing should be authorized based on this session until this
    /// returns `false`.
    pub fn is_initializing(&self) -> bool { !self.bootstrapped.initialized() }

    pub fn state(&self) -> SessionState {
        if self.is_initializing() {
            SessionState::Bootstrapping
        } else if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool { self.read().is_some() }

    pub fn current_user(&self) -> Option<User> {
        self.read().as_ref().map(|c| c.user.clone())
    }

    pub fn current_token(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.token.clone())
    }

    /// Log in with an email and password.
    ///
    /// Failures leave the session untouched.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoggedIn, AuthError> {
        let granted = endpoints::login(&self.transport, email, password)
            .await
            .map_err(|e| report("log in", e))?;

        let user = granted.credentials.user.clone();
        self.adopt_credentials(granted.credentials);

        Ok(LoggedIn {
            user,
            message: granted.message,
        })
    }

    /// Create a new account.
    ///
    /// This never changes the session, see [`endpoints::register()`].
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Registered, AuthError> {
        endpoints::register(&self.transport, registration)
            .await
            .map_err(|e| report("register", e))
    }

    /// Forget the current user. Logging out twice is harmless.
    pub fn logout(&self) {
        let previous = self.write().take();
        self.clear_store();

        if let Some(previous) = previous {
            log::info!("Logged out {}", previous.user.email);
        }
    }

    /// Replace the current user's profile without contacting the server.
    ///
    /// A profile without a matching token is meaningless, so this is ignored
    /// when nobody is logged in.
    pub fn update_user(&self, user: User) {
        let mut credentials = self.write();

        match credentials.as_mut() {
            Some(current) => {
                if !self.save_user(&user) {
                    // the stored token would outlive its user
                    self.clear_store();
                }
                current.user = user;
            },
            None => log::warn!("Ignoring a profile update while logged out"),
        }
    }

    /// Fetch the latest profile from the server.
    ///
    /// Returns `None` without sending anything when nobody is logged in. A
    /// failed refresh leaves the session as it was.
    pub async fn refresh_profile(&self) -> Option<Result<User, AuthError>> {
        let token = self.current_token()?;

        let result = match endpoints::profile(&self.transport, &token).await {
            Ok(user) => {
                self.update_user(user.clone());
                Ok(user)
            },
            Err(e) => Err(report("refresh the profile", e)),
        };

        Some(result)
    }

    /// Start a session from credentials the server issued through some
    /// other channel (e.g. [`endpoints::verify_email()`]).
    pub fn adopt_credentials(&self, credentials: Credentials) {
        let mut current = self.write();

        let saved = self.save(Slot::Token, &credentials.token)
            && self.save_user(&credentials.user);
        if !saved {
            // never leave half of a pair (or the previous user's) on disk
            self.clear_store();
        }
        *current = Some(credentials);
    }

    /// The [`Transport`] used to talk to the server, for making other API
    /// calls on behalf of the current user.
    pub fn transport(&self) -> &T { &self.transport }

    #[cfg(test)]
    fn store(&self) -> &S { &self.store }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credentials>> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Credentials>> {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self, slot: Slot) -> Option<String> {
        match self.store.get(slot) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Unable to read the {} slot: {}", slot.key(), e);
                None
            },
        }
    }

    fn save(&self, slot: Slot, value: &str) -> bool {
        match self.store.set(slot, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Unable to save the {} slot: {}", slot.key(), e);
                false
            },
        }
    }

    fn save_user(&self, user: &User) -> bool {
        match user.to_stored_json() {
            Ok(json) => self.save(Slot::User, &json),
            Err(e) => {
                log::warn!("Unable to serialize the user: {}", e);
                false
            },
        }
    }

    fn clear_store(&self) {
        for slot in Slot::ALL.iter().copied() {
            if let Err(e) = self.store.remove(slot) {
                log::warn!("Unable to clear the {} slot: {}", slot.key(), e);
            }
        }
    }
}

fn report(action: &str, error: AuthError) -> AuthError {
    match &error {
        AuthError::Transport(EndpointError::ResponseParse(e)) => {
            log::error!("Unable to {}, bad response: {}", action, e)
        },
        AuthError::Transport(e) => log::error!("Unable to {}: {}", action, e),
        _ => log::debug!("Unable to {}: {}", action, error),
    }

    error
}
