//! In-process fake of the bookshelf REST API.
//!
//! Users: `admin` (ROLE_ADMIN) and `reader` (ROLE_USER), both with password
//! `secret`. Their tokens are `admin-token` and `reader-token`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use bookshelf_lib::BookshelfClient;
use bookshelf_lib::model::AuthResponse;
use bookshelf_lib::model::Book;
use bookshelf_lib::model::BookCategory;
use bookshelf_lib::model::LoginCredentials;
use bookshelf_lib::model::User;
use bookshelf_lib::session::SessionStorage;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::header::AUTHORIZATION;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const READER_TOKEN: &str = "reader-token";

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

pub struct State {
    pub books: Vec<Book>,
    pub next_id: i64,
    pub seen: Vec<Seen>,
    tokens: HashMap<String, User>,
}

impl State {
    fn seeded() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(
            ADMIN_TOKEN.to_string(),
            User {
                username: "admin".to_string(),
                role: "ROLE_ADMIN".to_string(),
            },
        );
        tokens.insert(
            READER_TOKEN.to_string(),
            User {
                username: "reader".to_string(),
                role: "ROLE_USER".to_string(),
            },
        );

        Self {
            books: vec![
                sample_book(1, "Germinal", "Émile Zola", BookCategory::Roman),
                sample_book(2, "Les Fleurs du mal", "Charles Baudelaire", BookCategory::Poesie),
                sample_book(3, "Le Cid", "Pierre Corneille", BookCategory::Theatre),
            ],
            next_id: 4,
            seen: Vec::new(),
            tokens,
        }
    }
}

pub fn sample_book(id: i64, title: &str, author: &str, category: BookCategory) -> Book {
    Book {
        id: Some(id),
        title: title.to_string(),
        author: author.to_string(),
        isbn: format!("978-{:010}", id),
        price: 9.5,
        description: None,
        category,
        publication_year: None,
        cover_url: None,
    }
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<State>>,
}

impl FakeBackend {
    /// Starts the fake API on an ephemeral port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(State::seeded()));

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&server_state);
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(Arc::clone(&state), req));
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Builds a client for this backend over `storage`.
    pub fn client(&self, storage: Arc<dyn SessionStorage>) -> BookshelfClient {
        BookshelfClient::builder()
            .url(self.url())
            .shared_storage(storage)
            .build()
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.lock().unwrap().seen.clone()
    }

    pub fn last_seen(&self) -> Seen {
        self.seen().pop().expect("no request reached the backend")
    }

    pub fn books(&self) -> Vec<Book> {
        self.state.lock().unwrap().books.clone()
    }
}

async fn handle(
    state: Arc<Mutex<State>>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };

    let mut state = state.lock().unwrap();
    state.seen.push(Seen {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
    });

    Ok(route(&mut state, &method, &path, authorization.as_deref(), &body))
}

fn route(
    state: &mut State,
    method: &str,
    path: &str,
    authorization: Option<&str>,
    body: &[u8],
) -> Response<Full<Bytes>> {
    let user = authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|token| state.tokens.get(token))
        .cloned();

    let segments: Vec<&str> = path
        .trim_start_matches("/api")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (method, segments.as_slice()) {
        ("POST", ["auth", "login"]) => {
            let Ok(credentials) = serde_json::from_slice::<LoginCredentials>(body) else {
                return status(StatusCode::BAD_REQUEST, "bad credentials body");
            };
            let found = state
                .tokens
                .iter()
                .find(|(_, u)| u.username == credentials.username);
            match found {
                Some((token, user)) if credentials.password == "secret" => json(
                    StatusCode::OK,
                    &AuthResponse {
                        token: token.clone(),
                        username: user.username.clone(),
                        role: user.role.clone(),
                    },
                ),
                _ => status(StatusCode::UNAUTHORIZED, ""),
            }
        }
        ("GET", ["auth", "me"]) => match user {
            Some(user) => json(StatusCode::OK, &user),
            None => status(StatusCode::UNAUTHORIZED, ""),
        },
        ("GET", ["books"]) => json(StatusCode::OK, &state.books),
        ("GET", ["books", id]) => match find(state, id) {
            Some(index) => json(StatusCode::OK, &state.books[index]),
            None => status(StatusCode::NOT_FOUND, "Book not found"),
        },
        ("POST", ["books"]) => {
            if let Err(denied) = require_admin(user.as_ref()) {
                return denied;
            }
            let Ok(mut book) = serde_json::from_slice::<Book>(body) else {
                return status(StatusCode::BAD_REQUEST, "invalid book");
            };
            book.id = Some(state.next_id);
            state.next_id += 1;
            state.books.push(book.clone());
            json(StatusCode::CREATED, &book)
        }
        ("PUT", ["books", id]) => {
            if let Err(denied) = require_admin(user.as_ref()) {
                return denied;
            }
            let Some(index) = find(state, id) else {
                return status(StatusCode::NOT_FOUND, "Book not found");
            };
            let Ok(serde_json::Value::Object(changes)) = serde_json::from_slice(body) else {
                return status(StatusCode::BAD_REQUEST, "invalid changes");
            };
            let mut current = serde_json::to_value(&state.books[index]).unwrap();
            if let Some(fields) = current.as_object_mut() {
                fields.extend(changes);
            }
            let Ok(mut updated) = serde_json::from_value::<Book>(current) else {
                return status(StatusCode::BAD_REQUEST, "invalid changes");
            };
            updated.id = state.books[index].id;
            state.books[index] = updated.clone();
            json(StatusCode::OK, &updated)
        }
        ("DELETE", ["books", id]) => {
            if let Err(denied) = require_admin(user.as_ref()) {
                return denied;
            }
            match find(state, id) {
                Some(index) => {
                    state.books.remove(index);
                    status(StatusCode::NO_CONTENT, "")
                }
                None => status(StatusCode::NOT_FOUND, "Book not found"),
            }
        }
        ("GET", ["broken"]) => status(StatusCode::OK, "this is not json"),
        _ => status(StatusCode::NOT_FOUND, ""),
    }
}

fn find(state: &State, id: &str) -> Option<usize> {
    let id: i64 = id.parse().ok()?;
    state.books.iter().position(|b| b.id == Some(id))
}

fn require_admin(user: Option<&User>) -> Result<(), Response<Full<Bytes>>> {
    match user {
        None => Err(status(StatusCode::UNAUTHORIZED, "")),
        Some(user) if !user.is_admin() => Err(status(StatusCode::FORBIDDEN, "Access denied")),
        Some(_) => Ok(()),
    }
}

fn json<T: Serialize>(code: StatusCode, body: &T) -> Response<Full<Bytes>> {
    Response::builder()
        .status(code)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(serde_json::to_vec(body).unwrap())))
        .unwrap()
}

fn status(code: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(code)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
