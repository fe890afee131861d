//! Pattern-matching engine: an ordered set of compiled rules plus URL settings.
//!
//! # Responsibilities
//! - Match a path against rules in order (first match wins)
//! - Render the first rule able to produce a URL for a route
//! - Apply base/script URL prefix, global suffix and host info
//! - Fall back to `route` ⇄ `path` when no rule applies (unless strict)

use axum::http::Method;

use crate::config::schema::UrlConfig;
use crate::error::RouteError;
use crate::routing::params::Params;
use crate::routing::matcher::{strip_suffix, UrlRule};

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: String,
    pub params: Params,
}

/// Compiled, immutable rule set.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<UrlRule>,
    base_url: String,
    script_url: String,
    show_script_name: bool,
    suffix: Option<String>,
    host_info: Option<String>,
    strict: bool,
}

impl RuleEngine {
    pub fn new(rules: Vec<UrlRule>, urls: &UrlConfig) -> Self {
        Self {
            rules,
            base_url: urls.base_url.trim_end_matches('/').to_string(),
            script_url: urls.script_url.trim_end_matches('/').to_string(),
            show_script_name: urls.show_script_name,
            suffix: urls.suffix.clone().filter(|s| !s.is_empty()),
            host_info: urls.host_info.as_ref().map(|h| h.trim_end_matches('/').to_string()),
            strict: urls.strict,
        }
    }

    pub fn rules(&self) -> &[UrlRule] {
        &self.rules
    }

    /// Prefix placed in front of every relative URL.
    pub fn prefix(&self) -> &str {
        if self.show_script_name {
            &self.script_url
        } else {
            &self.base_url
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    pub fn host_info(&self) -> Option<&str> {
        self.host_info.as_deref()
    }

    /// Match a path. `host_info` is only consulted by rules with a host template.
    pub fn parse(&self, path_info: &str, method: &Method, host_info: Option<&str>) -> Option<RouteMatch> {
        let path = path_info.trim_start_matches('/');
        let host_info = host_info.or(self.host_info.as_deref());

        for rule in &self.rules {
            if let Some((route, params)) = rule.parse(path, method, host_info, self.suffix.as_deref()) {
                tracing::trace!(route = %route, pattern = %rule.spec().pattern, "Rule matched");
                return Some(RouteMatch { route, params });
            }
        }

        if self.strict {
            return None;
        }

        let route = strip_suffix(path, self.suffix.as_deref())?;
        Some(RouteMatch {
            route: route.to_string(),
            params: Params::new(),
        })
    }

    /// Create a URL for `route`. Host rules yield absolute URLs.
    pub fn create_url(&self, route: &str, params: &Params) -> Result<String, RouteError> {
        let route = route.trim_matches('/');
        let prefix = self.prefix();

        for rule in &self.rules {
            if let Some(url) = rule.create(route, params, self.suffix.as_deref()) {
                return Ok(match url.find("://") {
                    Some(scheme_end) => insert_after_authority(&url, scheme_end + 3, prefix),
                    None => format!("{}/{}", prefix, url.trim_start_matches('/')),
                });
            }
        }

        if self.strict {
            return Err(RouteError::NoRoute(route.to_string()));
        }

        let mut url = format!("{}/{}", prefix, route);
        if let Some(suffix) = &self.suffix {
            if !route.is_empty() {
                url.push_str(suffix);
            }
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query());
        }
        Ok(url)
    }

    /// Create an absolute URL, optionally forcing the scheme.
    pub fn create_absolute_url(
        &self,
        route: &str,
        params: &Params,
        scheme: Option<&str>,
    ) -> Result<String, RouteError> {
        let mut url = self.create_url(route, params)?;
        if !url.contains("://") {
            match &self.host_info {
                Some(host) => url = format!("{}{}", host, url),
                None => {
                    tracing::debug!(route = %route, "No host info configured; URL stays relative");
                    return Ok(url);
                }
            }
        }
        if let (Some(scheme), Some(pos)) = (scheme, url.find("://")) {
            url = format!("{}{}", scheme, &url[pos..]);
        }
        Ok(url)
    }
}

fn insert_after_authority(url: &str, authority_start: usize, prefix: &str) -> String {
    match url[authority_start..].find(['/', '?']) {
        Some(offset) => {
            let at = authority_start + offset;
            format!("{}{}{}", &url[..at], prefix, &url[at..])
        }
        None => format!("{}{}", url, prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::spec::RuleSpec;

    fn urls(base: &str, script: &str) -> UrlConfig {
        UrlConfig {
            base_url: base.to_string(),
            script_url: script.to_string(),
            ..UrlConfig::default()
        }
    }

    fn engine(specs: &[RuleSpec], urls: UrlConfig) -> RuleEngine {
        let rules = specs.iter().map(|s| UrlRule::compile(s).unwrap()).collect();
        RuleEngine::new(rules, &urls)
    }

    fn post_params() -> Params {
        Params::new().with("id", 1).with("title", "sample post")
    }

    #[test]
    fn test_fallback_urls() {
        let e = engine(&[], urls("/", ""));
        assert_eq!(e.create_url("post/view", &post_params()).unwrap(), "/post/view?id=1&title=sample+post");

        let e = engine(&[], urls("/test/", "/test"));
        assert_eq!(e.create_url("post/view", &post_params()).unwrap(), "/test/post/view?id=1&title=sample+post");

        let e = engine(&[], urls("/test", "/test/index.php"));
        assert_eq!(
            e.create_url("post/view", &post_params()).unwrap(),
            "/test/index.php/post/view?id=1&title=sample+post"
        );
    }

    #[test]
    fn test_rule_urls_with_suffix() {
        let mut cfg = urls("/", "");
        cfg.suffix = Some(".html".into());
        let e = engine(&[RuleSpec::new("post/<id>/<title>", "post/view")], cfg);
        assert_eq!(e.create_url("post/view", &post_params()).unwrap(), "/post/1/sample+post.html");
        assert_eq!(
            e.create_url("post/index", &Params::new().with("page", 1)).unwrap(),
            "/post/index.html?page=1"
        );
    }

    #[test]
    fn test_rule_suffix_overrides_global() {
        let mut cfg = urls("", "");
        cfg.suffix = Some(".html".into());
        let e = engine(&[RuleSpec::new("feed", "feed/index").with_suffix(".xml")], cfg);
        assert_eq!(e.create_url("feed/index", &Params::new()).unwrap(), "/feed.xml");
        assert_eq!(e.parse("feed.xml", &Method::GET, None).unwrap().route, "feed/index");
        assert_eq!(e.parse("feed.html", &Method::GET, None).unwrap().route, "feed");
    }

    #[test]
    fn test_host_rule_inserts_base_url() {
        let e = engine(
            &[RuleSpec::new("post/<id>/<title>", "post/view").with_host("http://<lang:en|fr>.example.com")],
            urls("/test", "/test"),
        );
        let params = post_params().with("lang", "en");
        assert_eq!(
            e.create_url("post/view", &params).unwrap(),
            "http://en.example.com/test/post/1/sample+post"
        );
    }

    #[test]
    fn test_strict_mode() {
        let mut cfg = urls("", "");
        cfg.strict = true;
        let e = engine(&[RuleSpec::new("post/<id>", "post/view")], cfg);
        assert_eq!(
            e.create_url("post/index", &Params::new()),
            Err(RouteError::NoRoute("post/index".into()))
        );
        assert!(e.parse("site/index", &Method::GET, None).is_none());
        assert!(e.parse("post/3", &Method::GET, None).is_some());
    }

    #[test]
    fn test_parse_fallback_and_suffix() {
        let mut cfg = urls("", "");
        cfg.suffix = Some(".html".into());
        let e = engine(&[RuleSpec::new("post/<id>/<title>", "post/view")], cfg);

        let m = e.parse("post/123/this+is+sample.html", &Method::GET, None).unwrap();
        assert_eq!(m.route, "post/view");
        assert_eq!(m.params.get("id"), Some("123"));

        assert!(e.parse("post/123/this+is+sample", &Method::GET, None).is_none());
        assert_eq!(e.parse("site/index.html", &Method::GET, None).unwrap().route, "site/index");
        assert!(e.parse("site/index", &Method::GET, None).is_none());
        assert_eq!(e.parse("", &Method::GET, None).unwrap().route, "");
    }

    #[test]
    fn test_absolute_urls() {
        let mut cfg = urls("/", "");
        cfg.host_info = Some("http://www.example.com".into());
        let e = engine(&[], cfg);
        assert_eq!(
            e.create_absolute_url("post/view", &post_params(), None).unwrap(),
            "http://www.example.com/post/view?id=1&title=sample+post"
        );
        assert_eq!(
            e.create_absolute_url("post/view", &post_params(), Some("https")).unwrap(),
            "https://www.example.com/post/view?id=1&title=sample+post"
        );
    }
}
