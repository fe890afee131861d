//! Language resolution middleware.
//!
//! Runs [`LanguageRouter::parse`] for every request and hands the outcome to handlers
//! through request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::language::SharedLocale;
use crate::routing::{LanguageRouter, LanguageRoutes, Params, Parsed, PathRequest};

/// Outcome of language resolution, inserted into request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRoute {
    pub route: String,
    pub params: Params,
    pub language: String,
    pub locale: String,
}

/// Wrap `router` so every request passes through [`language_middleware`].
pub fn language_layer<S>(router: Router<S>, routes: Arc<LanguageRoutes>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(routes, language_middleware))
}

pub async fn language_middleware(
    State(routes): State<Arc<LanguageRoutes>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path_info = path_info(&routes, req.uri().path());
    let host_info = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("{}://{}", request_scheme(&routes, &req), host));

    let mut request = PathRequest::new(path_info, req.method().clone());
    request.host_info = host_info;

    let locale = SharedLocale::new();
    let mut router = routes.router(Arc::new(locale.clone()));

    let matched = match router.parse(&request) {
        Ok(Some(Parsed::Route(matched))) => matched,
        Ok(Some(Parsed::Redirect { location })) => {
            return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
        }
        Ok(None) => {
            tracing::debug!(path = %request.path_info, "No route matched");
            return (StatusCode::NOT_FOUND, "No matching route found").into_response();
        }
        Err(e) => {
            tracing::debug!(path = %request.path_info, error = %e, "Language rejected");
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };

    let resolved = ResolvedRoute {
        route: matched.route,
        params: matched.params,
        language: router.current_language().to_string(),
        locale: locale.get().unwrap_or_else(|| router.current_locale()),
    };
    req.extensions_mut().insert(resolved);
    req.extensions_mut().insert::<LanguageRouter>(router);

    next.run(req).await
}

/// Scheme of the request URI. Origin-form URIs carry none, so the scheme of the
/// configured host info is used, then `http`.
fn request_scheme<'a>(routes: &'a LanguageRoutes, req: &'a Request<Body>) -> &'a str {
    req.uri()
        .scheme_str()
        .or_else(|| {
            routes
                .engine()
                .host_info()
                .and_then(|host| host.split_once("://"))
                .map(|(scheme, _)| scheme)
        })
        .unwrap_or("http")
}

/// Request path below the script URL (or base URL), without the leading slash.
fn path_info(routes: &LanguageRoutes, path: &str) -> String {
    let engine = routes.engine();
    let stripped = [engine.script_url(), engine.base_url()]
        .into_iter()
        .filter(|prefix| !prefix.is_empty())
        .find_map(|prefix| {
            path.strip_prefix(prefix)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .unwrap_or(path);
    let decoded = urlencoding::decode(stripped)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stripped.to_string());
    decoded.trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::language::RawLanguages;

    fn routes(base: &str, script: &str) -> LanguageRoutes {
        let mut config = RouterConfig {
            languages: RawLanguages::codes(["en", "ru"]),
            ..RouterConfig::default()
        };
        config.urls.base_url = base.into();
        config.urls.script_url = script.into();
        LanguageRoutes::build(&config, None).unwrap()
    }

    #[test]
    fn test_request_scheme_falls_back_to_configured_host() {
        let request = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

        let mut config = RouterConfig {
            languages: RawLanguages::codes(["en", "ru"]),
            ..RouterConfig::default()
        };
        config.urls.host_info = Some("https://www.example.com".into());
        let r = LanguageRoutes::build(&config, None).unwrap();
        assert_eq!(request_scheme(&r, &request("/post/1")), "https");
        assert_eq!(request_scheme(&r, &request("http://www.example.com/post/1")), "http");

        assert_eq!(request_scheme(&routes("", ""), &request("/post/1")), "http");
    }

    #[test]
    fn test_path_info_strips_prefix() {
        let r = routes("/app", "/app/index.php");
        assert_eq!(path_info(&r, "/app/index.php/ru/post/1"), "ru/post/1");
        assert_eq!(path_info(&r, "/app/ru/post/1"), "ru/post/1");
        assert_eq!(path_info(&r, "/application/x"), "application/x");

        let r = routes("", "");
        assert_eq!(path_info(&r, "/ru/post%20one"), "ru/post one");
    }
}
