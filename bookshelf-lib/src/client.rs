//! Main BookshelfClient

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::error::Error;
use crate::session::SessionStorage;
use crate::session::TOKEN_KEY;
use crate::session::USER_KEY;

/// Callback run after a 401 response has cleared the session.
///
/// It receives the login route so the embedding application can navigate there.
pub type UnauthorizedHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Client for the bookshelf REST API.
///
/// Every request carries `Authorization: Bearer <token>` when the session
/// storage holds a token. A 401 answer wipes the stored token and user and
/// runs the unauthorized hook before the error is returned.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use bookshelf_lib::BookshelfClient;
/// use bookshelf_lib::session::MemoryStorage;
///
/// let client = BookshelfClient::builder()
///     .url("http://localhost:8080/api")
///     .storage(MemoryStorage::new())
///     .on_unauthorized(|route| println!("please sign in at {route}"))
///     .build();
///
/// let books: Vec<Book> = client.get("/books").await?;
/// ```
#[derive(Clone)]
pub struct BookshelfClient {
    inner: Arc<BookshelfClientInner>,
}

struct BookshelfClientInner {
    base_url: String,
    storage: Arc<dyn SessionStorage>,
    http_client: Client,
    timeout: Option<Duration>,
    login_route: String,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl BookshelfClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> BookshelfClientBuilder<Missing, Missing> {
        BookshelfClientBuilder::new()
    }

    /// Returns the base URL of the API.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the route passed to the unauthorized hook.
    pub fn login_route(&self) -> &str {
        &self.inner.login_route
    }

    /// Returns the session storage shared with the stores.
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.inner.storage
    }

    /// Sends a request and returns the raw response if its status is 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] for any other status. A 401 also clears the
    /// persisted session first.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path);

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(token) = self.inner.storage.get(TOKEN_KEY).await? {
            request = request.bearer_auth(token);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.body(serde_json::to_string(body)?);
        }

        debug!("{} {}", method, url);

        let response = request.send().await.map_err(|e| self.send_error(e))?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized().await;
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            body
        };
        debug!("{} {} failed with {}", method, url, status);
        Err(ApiError::http(status.as_u16(), message).into())
    }

    /// `GET path` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.request::<()>(Method::GET, path, None).await?;
        decode(response).await
    }

    /// `POST path` with a JSON body and decode the JSON answer.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path, Some(body)).await?;
        decode(response).await
    }

    /// `PUT path` with a JSON body and decode the JSON answer.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::PUT, path, Some(body)).await?;
        decode(response).await
    }

    /// `DELETE path`, ignoring any body.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.request::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url.trim_end_matches('/'), path)
    }

    fn send_error(&self, error: reqwest::Error) -> ApiError {
        match self.inner.timeout {
            Some(timeout) if error.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(error),
        }
    }

    /// Drops the persisted session and notifies the hook.
    async fn handle_unauthorized(&self) {
        warn!("Unauthorized response, clearing session");

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.inner.storage.remove(key).await {
                warn!("Failed to remove '{}' from session storage: {}", key, e);
            }
        }

        if let Some(hook) = &self.inner.on_unauthorized {
            hook(&self.inner.login_route);
        }
    }
}

impl fmt::Debug for BookshelfClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookshelfClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .field("login_route", &self.inner.login_route)
            .finish_non_exhaustive()
    }
}

/// Decodes a JSON body, keeping the raw text on failure.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let text = response.text().await.map_err(ApiError::from)?;
    serde_json::from_str(&text).map_err(|e| ApiError::parse_with_body(e.to_string(), text).into())
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`BookshelfClient`].
///
/// # Required Fields
///
/// - `url` - The API base URL (e.g. `http://localhost:8080/api`)
/// - `storage` - A [`SessionStorage`] implementation holding the token
pub struct BookshelfClientBuilder<Url, Storage> {
    url: Url,
    storage: Storage,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    login_route: String,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl BookshelfClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            storage: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            login_route: "/login".to_string(),
            on_unauthorized: None,
        }
    }
}

impl Default for BookshelfClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> BookshelfClientBuilder<Missing, S> {
    /// Sets the API base URL.
    pub fn url(self, url: impl Into<String>) -> BookshelfClientBuilder<Set<String>, S> {
        BookshelfClientBuilder {
            url: Set(url.into()),
            storage: self.storage,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            login_route: self.login_route,
            on_unauthorized: self.on_unauthorized,
        }
    }
}

impl<U> BookshelfClientBuilder<U, Missing> {
    /// Sets the session storage the token is read from.
    pub fn storage<T: SessionStorage + 'static>(
        self,
        storage: T,
    ) -> BookshelfClientBuilder<U, Set<Arc<dyn SessionStorage>>> {
        self.shared_storage(Arc::new(storage))
    }

    /// Sets a session storage that is also held elsewhere.
    pub fn shared_storage(
        self,
        storage: Arc<dyn SessionStorage>,
    ) -> BookshelfClientBuilder<U, Set<Arc<dyn SessionStorage>>> {
        BookshelfClientBuilder {
            url: self.url,
            storage: Set(storage),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            login_route: self.login_route,
            on_unauthorized: self.on_unauthorized,
        }
    }
}

impl<U, S> BookshelfClientBuilder<U, S> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the route handed to the unauthorized hook. Defaults to `/login`.
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Sets the callback run after a 401 has cleared the session.
    pub fn on_unauthorized<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }
}

impl BookshelfClientBuilder<Set<String>, Set<Arc<dyn SessionStorage>>> {
    /// Builds the [`BookshelfClient`].
    pub fn build(self) -> BookshelfClient {
        let http_client = self.http_client.unwrap_or_else(|| {
            let mut builder = Client::builder();
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            builder.build().expect("Failed to build HTTP client")
        });

        BookshelfClient {
            inner: Arc::new(BookshelfClientInner {
                base_url: self.url.0,
                storage: self.storage.0,
                http_client,
                timeout: self.timeout,
                login_route: self.login_route,
                on_unauthorized: self.on_unauthorized,
            }),
        }
    }
}
