//! Session state: token and signed-in user

use log::debug;
use log::warn;

use crate::client::BookshelfClient;
use crate::error::Error;
use crate::model::AuthResponse;
use crate::model::LoginCredentials;
use crate::model::User;
use crate::session::TOKEN_KEY;
use crate::session::USER_KEY;

/// Tracks who is signed in and mirrors it to session storage.
///
/// # Example
///
/// ```ignore
/// let mut auth = AuthStore::load(client.clone()).await?;
/// if !auth.is_authenticated() {
///     auth.login(&LoginCredentials::new("admin", "secret")).await?;
/// }
/// assert!(auth.is_admin());
/// ```
#[derive(Debug)]
pub struct AuthStore {
    client: BookshelfClient,
    token: Option<String>,
    user: Option<User>,
}

impl AuthStore {
    /// Restores the session persisted in the client's storage.
    ///
    /// A stored user that cannot be parsed is ignored.
    pub async fn load(client: BookshelfClient) -> Result<Self, Error> {
        let storage = client.storage();
        let token = storage.get(TOKEN_KEY).await?;
        let user = match storage.get(USER_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)
                .inspect_err(|e| warn!("Ignoring unreadable stored user: {}", e))
                .ok(),
            None => None,
        };

        Ok(Self {
            client,
            token,
            user,
        })
    }

    /// Returns the bearer token, if signed in.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the signed-in user, if known.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns `true` if a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns `true` if the user has the administrator role.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Returns the username, or an empty string when nobody is signed in.
    pub fn username(&self) -> &str {
        self.user.as_ref().map(|u| u.username.as_str()).unwrap_or_default()
    }

    /// Signs in with `POST /auth/login` and persists the session.
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<(), Error> {
        let response: AuthResponse = self.client.post("/auth/login", credentials).await?;
        let token = response.token.clone();
        let user = User::from(response);

        let storage = self.client.storage();
        storage.set(TOKEN_KEY, &token).await?;
        storage.set(USER_KEY, &serde_json::to_string(&user)?).await?;

        debug!("Signed in as {}", user.username);
        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    /// Forgets the session in memory and in storage.
    pub async fn logout(&mut self) -> Result<(), Error> {
        self.token = None;
        self.user = None;

        let storage = self.client.storage();
        storage.remove(TOKEN_KEY).await?;
        storage.remove(USER_KEY).await?;
        Ok(())
    }

    /// Confirms the token with `GET /auth/me`.
    ///
    /// Returns `false` without a request when there is no token. Any failure
    /// signs the user out and returns `false`.
    pub async fn check_auth(&mut self) -> bool {
        if self.token.is_none() {
            return false;
        }

        match self.client.get::<User>("/auth/me").await {
            Ok(user) => {
                match serde_json::to_string(&user) {
                    Ok(raw) => {
                        if let Err(e) = self.client.storage().set(USER_KEY, &raw).await {
                            warn!("Failed to persist user: {}", e);
                        }
                    }
                    Err(e) => warn!("Failed to serialize user: {}", e),
                }
                self.user = Some(user);
                true
            }
            Err(e) => {
                debug!("Session check failed: {}", e);
                if let Err(e) = self.logout().await {
                    warn!("Failed to clear session: {}", e);
                }
                false
            }
        }
    }
}
