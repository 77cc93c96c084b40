mod common;

use std::sync::Arc;
use std::sync::Mutex;

use bookshelf_lib::BookshelfClient;
use bookshelf_lib::error::ApiError;
use bookshelf_lib::error::Error;
use bookshelf_lib::model::Book;
use bookshelf_lib::session::MemoryStorage;
use bookshelf_lib::session::SessionStorage;
use bookshelf_lib::session::TOKEN_KEY;
use bookshelf_lib::session::USER_KEY;
use common::ADMIN_TOKEN;
use common::FakeBackend;

fn signed_in(token: &str) -> Arc<dyn SessionStorage> {
    Arc::new(
        MemoryStorage::new()
            .with(TOKEN_KEY, token)
            .with(USER_KEY, r#"{"username":"admin","role":"ROLE_ADMIN"}"#),
    )
}

#[tokio::test]
async fn test_bearer_token_is_attached_when_stored() {
    let backend = FakeBackend::start().await;
    let client = backend.client(signed_in(ADMIN_TOKEN));

    let books: Vec<Book> = client.get("/books").await.unwrap();
    assert_eq!(books.len(), 3);

    let seen = backend.last_seen();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "/api/books");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer admin-token"));
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let backend = FakeBackend::start().await;
    let client = backend.client(Arc::new(MemoryStorage::new()));

    let _: Vec<Book> = client.get("/books").await.unwrap();
    assert_eq!(backend.last_seen().authorization, None);
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_runs_hook() {
    let backend = FakeBackend::start().await;
    let storage = signed_in("expired-token");
    let redirects = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&redirects);
    let client = BookshelfClient::builder()
        .url(backend.url())
        .shared_storage(Arc::clone(&storage))
        .on_unauthorized(move |route| recorded.lock().unwrap().push(route.to_string()))
        .build();

    let err = client.get::<serde_json::Value>("/auth/me").await.unwrap_err();
    assert!(err.is_unauthorized());

    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(storage.get(USER_KEY).await.unwrap(), None);
    assert_eq!(*redirects.lock().unwrap(), ["/login"]);
}

#[tokio::test]
async fn test_hook_receives_custom_login_route() {
    let backend = FakeBackend::start().await;
    let redirects = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&redirects);
    let client = BookshelfClient::builder()
        .url(backend.url())
        .storage(MemoryStorage::new())
        .login_route("/sign-in")
        .on_unauthorized(move |route| recorded.lock().unwrap().push(route.to_string()))
        .build();

    assert!(client.delete("/books/1").await.unwrap_err().is_unauthorized());
    assert_eq!(*redirects.lock().unwrap(), ["/sign-in"]);
}

#[tokio::test]
async fn test_other_errors_keep_the_session() {
    let backend = FakeBackend::start().await;
    let storage = signed_in(ADMIN_TOKEN);
    let client = backend.client(Arc::clone(&storage));

    let err = client.get::<Book>("/books/999").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    match err {
        Error::Api(ApiError::Http { message, .. }) => assert_eq!(message, "Book not found"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(storage.get(TOKEN_KEY).await.unwrap().as_deref(), Some(ADMIN_TOKEN));
}

#[tokio::test]
async fn test_forbidden_is_not_unauthorized() {
    let backend = FakeBackend::start().await;
    let storage = signed_in(common::READER_TOKEN);
    let client = backend.client(Arc::clone(&storage));

    let err = client.delete("/books/1").await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert!(!err.is_unauthorized());
    assert!(storage.get(TOKEN_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unparsable_body_keeps_raw_text() {
    let backend = FakeBackend::start().await;
    let client = backend.client(Arc::new(MemoryStorage::new()));

    let err = client.get::<Vec<Book>>("/broken").await.unwrap_err();
    match err {
        Error::Api(ApiError::Parse { body, .. }) => {
            assert_eq!(body.as_deref(), Some("this is not json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let client = BookshelfClient::builder()
        .url("http://127.0.0.1:9/api")
        .storage(MemoryStorage::new())
        .build();

    let err = client.get::<Vec<Book>>("/books").await.unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Network(_))));
    assert_eq!(err.status_code(), None);
}
