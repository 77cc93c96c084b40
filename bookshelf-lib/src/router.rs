//! Route table and navigation guard
//!
//! Routes carry three flags: `requires_auth`, `requires_admin` and `guest`
//! (only for signed-out visitors). [`Router::guard`] decides whether a
//! navigation may proceed given the current [`AuthStore`].

use std::collections::HashMap;

use log::debug;

use crate::store::AuthStore;

/// Access flags attached to a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
    pub guest: bool,
}

impl RouteMeta {
    /// Signed-in administrators only.
    pub const ADMIN: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_admin: true,
        guest: false,
    };

    /// Signed-out visitors only.
    pub const GUEST: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_admin: false,
        guest: true,
    };
}

/// A named path pattern. Segments starting with `:` capture a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub path: String,
    pub meta: RouteMeta,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            meta,
        }
    }

    /// Matches a path (without query string) and returns the captured parameters.
    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(&actual) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), got.to_string());
                }
                None if expected == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Outcome of [`Router::guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The navigation may go ahead.
    Proceed,
    /// Navigate to the named route instead.
    Redirect {
        route: String,
        path: String,
        query: Vec<(String, String)>,
    },
    /// No route matches the path.
    NotFound,
}

impl Navigation {
    /// Returns the redirect target as a path with an encoded query string.
    pub fn location(&self) -> Option<String> {
        let Navigation::Redirect { path, query, .. } = self else {
            return None;
        };
        if query.is_empty() {
            return Some(path.clone());
        }
        let query = query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        Some(format!("{}?{}", path, query))
    }
}

/// The application's routes.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(vec![
            Route::new("home", "/", RouteMeta::default()),
            Route::new("books", "/books", RouteMeta::default()),
            Route::new("book-detail", "/books/:id", RouteMeta::default()),
            Route::new("login", "/login", RouteMeta::GUEST),
            Route::new("admin", "/admin", RouteMeta::ADMIN),
            Route::new("book-create", "/admin/books/new", RouteMeta::ADMIN),
            Route::new("book-edit", "/admin/books/:id/edit", RouteMeta::ADMIN),
        ])
    }
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks a route up by name.
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Finds the first route matching `path`. Any query string is ignored.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| RouteMatch { route, params })
        })
    }

    /// Decides whether navigating to `full_path` is allowed.
    ///
    /// A stored token without a known user is confirmed with the backend
    /// first, which may sign the user out.
    pub async fn guard(&self, full_path: &str, auth: &mut AuthStore) -> Navigation {
        let Some(target) = self.resolve(full_path) else {
            return Navigation::NotFound;
        };
        let meta = target.route.meta;

        if auth.is_authenticated() && auth.user().is_none() {
            auth.check_auth().await;
        }

        let decision = if meta.requires_auth && !auth.is_authenticated() {
            self.redirect("login", vec![("redirect".to_string(), full_path.to_string())])
        } else if meta.requires_admin && !auth.is_admin() {
            self.redirect("home", Vec::new())
        } else if meta.guest && auth.is_authenticated() {
            self.redirect("home", Vec::new())
        } else {
            Navigation::Proceed
        };

        debug!("guard {} -> {:?}", full_path, decision);
        decision
    }

    fn redirect(&self, name: &str, query: Vec<(String, String)>) -> Navigation {
        let path = self.route(name).map_or("/", |r| r.path.as_str()).to_string();
        Navigation::Redirect {
            route: name.to_string(),
            path,
            query,
        }
    }
}
