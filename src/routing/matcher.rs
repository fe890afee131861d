//! Compiled URL rule.
//!
//! # Responsibilities
//! - Turn a `RuleSpec` pattern (and optional host template) into an anchored regex
//! - Parse a path (plus host info for host rules) into route + parameters
//! - Render route + parameters back into a path or absolute URL
//!
//! # Design Decisions
//! - Placeholders default to `[^/]+`; everything else is matched literally
//! - Captured values are returned raw; rendered values are form-encoded
//! - Parameters not consumed by the pattern become the query string

use axum::http::Method;
use regex::Regex;

use crate::error::ConfigError;
use crate::routing::params::{form_encode, Params};
use crate::rules::spec::{placeholders, RuleMode, RuleSpec};

const DEFAULT_PARAM_REGEX: &str = "[^/]+";

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param(usize),
}

#[derive(Debug, Clone)]
struct ParamRule {
    name: String,
    regex: Regex,
}

/// A single compiled rule.
#[derive(Debug, Clone)]
pub struct UrlRule {
    spec: RuleSpec,
    route: String,
    matcher: Regex,
    params: Vec<ParamRule>,
    host_template: Option<Vec<Segment>>,
    path_template: Vec<Segment>,
}

impl UrlRule {
    /// Compile a descriptor. Fails on an empty route or an invalid placeholder regex.
    pub fn compile(spec: &RuleSpec) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRule {
            pattern: spec.pattern.clone(),
            reason,
        };

        let route = spec.route.trim_matches('/').to_string();
        if route.is_empty() {
            return Err(invalid("route is empty".to_string()));
        }

        let mut params = Vec::new();
        let mut source = String::from("^");

        let host_template = match spec.host.as_deref() {
            Some(host) => {
                let host = host.trim_end_matches('/');
                let segments = tokenize(host, &mut params, &mut source).map_err(invalid)?;
                Some(segments)
            }
            None => None,
        };

        let pattern = spec.pattern.trim_matches('/');
        if host_template.is_some() && !pattern.is_empty() {
            source.push('/');
        }
        let path_template = tokenize(pattern, &mut params, &mut source).map_err(invalid)?;
        source.push('$');

        let matcher = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            spec: spec.clone(),
            route,
            matcher,
            params,
            host_template,
            path_template,
        })
    }

    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Match `path_info` (no leading slash). Host rules also need `host_info`
    /// (`scheme://authority`).
    pub fn parse(
        &self,
        path_info: &str,
        method: &Method,
        host_info: Option<&str>,
        default_suffix: Option<&str>,
    ) -> Option<(String, Params)> {
        if self.spec.mode == RuleMode::CreationOnly {
            return None;
        }
        if !self.spec.verbs.is_empty()
            && !self.spec.verbs.iter().any(|v| v.as_str() == method.as_str())
        {
            return None;
        }

        let path = strip_suffix(path_info, self.suffix(default_suffix))?;

        let subject = match self.host_template {
            Some(_) => {
                let host = host_info?.to_lowercase();
                if path.is_empty() {
                    host
                } else {
                    format!("{}/{}", host, path)
                }
            }
            None => path.to_string(),
        };

        let caps = self.matcher.captures(&subject)?;
        let params = self
            .params
            .iter()
            .filter_map(|p| caps.name(&p.name).map(|m| (p.name.clone(), m.as_str().to_string())))
            .collect();

        Some((self.route.clone(), params))
    }

    /// Render a URL for `route`, or `None` when this rule cannot produce it.
    ///
    /// The result has no leading slash unless the rule has a host, in which case
    /// it is absolute.
    pub fn create(&self, route: &str, params: &Params, default_suffix: Option<&str>) -> Option<String> {
        if self.spec.mode == RuleMode::ParsingOnly {
            return None;
        }
        if route.trim_matches('/') != self.route {
            return None;
        }

        let mut values = Vec::with_capacity(self.params.len());
        for p in &self.params {
            let value = params.get(&p.name)?;
            if !p.regex.is_match(value) {
                return None;
            }
            values.push(form_encode(value));
        }

        let mut url = render(&self.path_template, &values);
        if !url.is_empty() {
            url.push_str(self.suffix(default_suffix).unwrap_or_default());
        }
        if let Some(host) = &self.host_template {
            let host = render(host, &values);
            url = if url.is_empty() {
                host
            } else {
                format!("{}/{}", host, url)
            };
        }

        let leftover: Params = params
            .iter()
            .filter(|(name, _)| !self.params.iter().any(|p| p.name == *name))
            .collect();
        if !leftover.is_empty() {
            url.push('?');
            url.push_str(&leftover.to_query());
        }

        Some(url)
    }

    fn suffix<'a>(&'a self, default_suffix: Option<&'a str>) -> Option<&'a str> {
        self.spec.suffix.as_deref().or(default_suffix)
    }
}

/// Split `template` into segments, appending its regex form to `source` and any new
/// placeholders to `params`.
fn tokenize(
    template: &str,
    params: &mut Vec<ParamRule>,
    source: &mut String,
) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for placeholder in placeholders(template) {
        if placeholder.start > cursor {
            let literal = &template[cursor..placeholder.start];
            source.push_str(&regex::escape(literal));
            segments.push(Segment::Literal(literal.to_string()));
        }

        let pattern = placeholder.regex.unwrap_or(DEFAULT_PARAM_REGEX);
        source.push_str(&format!("(?P<{}>{})", placeholder.name, pattern));

        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| e.to_string())?;
        params.push(ParamRule {
            name: placeholder.name.to_string(),
            regex,
        });
        segments.push(Segment::Param(params.len() - 1));
        cursor = placeholder.end;
    }

    if cursor < template.len() {
        let literal = &template[cursor..];
        source.push_str(&regex::escape(literal));
        segments.push(Segment::Literal(literal.to_string()));
    }

    Ok(segments)
}

fn render(segments: &[Segment], values: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Param(idx) => out.push_str(values.get(*idx).map(String::as_str).unwrap_or_default()),
        }
    }
    out
}

/// Remove a required suffix. An empty path passes through; a missing suffix or a
/// path that is only the suffix does not match.
pub(crate) fn strip_suffix<'a>(path: &'a str, suffix: Option<&str>) -> Option<&'a str> {
    match suffix {
        Some(suffix) if !suffix.is_empty() && !path.is_empty() => {
            let stripped = path.strip_suffix(suffix)?;
            if stripped.is_empty() {
                None
            } else {
                Some(stripped)
            }
        }
        _ => Some(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::spec::Verb;

    fn rule(pattern: &str, route: &str) -> UrlRule {
        UrlRule::compile(&RuleSpec::new(pattern, route)).unwrap()
    }

    #[test]
    fn test_parse_extracts_params() {
        let r = rule("post/<id>/<title>", "post/view");
        let (route, params) = r.parse("post/123/this+is+sample", &Method::GET, None, None).unwrap();
        assert_eq!(route, "post/view");
        assert_eq!(params, Params::new().with("id", "123").with("title", "this+is+sample"));

        // Trailing slash is significant.
        assert!(r.parse("post/123/this+is+sample/", &Method::GET, None, None).is_none());
    }

    #[test]
    fn test_parse_with_regex_placeholder() {
        let r = rule("<language:(ua|en|ru)>/post/<id:\\d+>", "post/view");
        let (_, params) = r.parse("ua/post/7", &Method::GET, None, None).unwrap();
        assert_eq!(params.get("language"), Some("ua"));
        assert!(r.parse("de/post/7", &Method::GET, None, None).is_none());
        assert!(r.parse("ua/post/x", &Method::GET, None, None).is_none());
    }

    #[test]
    fn test_parse_respects_verbs_and_suffix() {
        let spec = RuleSpec::new("post/<id>", "post/delete").with_verbs([Verb::Delete]);
        let r = UrlRule::compile(&spec).unwrap();
        assert!(r.parse("post/1", &Method::GET, None, None).is_none());
        assert!(r.parse("post/1", &Method::DELETE, None, None).is_some());

        let r = rule("post/<id>", "post/view");
        assert!(r.parse("post/1.html", &Method::GET, None, Some(".html")).is_some());
        assert!(r.parse("post/1", &Method::GET, None, Some(".html")).is_none());
    }

    #[test]
    fn test_create_renders_and_queries_leftovers() {
        let r = rule("post/<id>/<title>", "post/view");
        let params = Params::new().with("id", 1).with("title", "sample post").with("page", 2);
        assert_eq!(
            r.create("post/view", &params, None).as_deref(),
            Some("post/1/sample+post?page=2")
        );
        assert_eq!(
            r.create("/post/view", &params, Some(".html")).as_deref(),
            Some("post/1/sample+post.html?page=2")
        );
        assert!(r.create("post/index", &params, None).is_none());
        assert!(r.create("post/view", &Params::new().with("id", 1), None).is_none());
    }

    #[test]
    fn test_create_checks_placeholder_regex() {
        let r = rule("<language:(ua|en)>/post/<id>", "post/view");
        assert_eq!(
            r.create("post/view", &Params::new().with("id", 1).with("language", "ua"), None)
                .as_deref(),
            Some("ua/post/1")
        );
        assert!(r
            .create("post/view", &Params::new().with("id", 1).with("language", "ru"), None)
            .is_none());
    }

    #[test]
    fn test_parsing_only_rule_never_creates() {
        let spec = RuleSpec::new("post", "post/create").with_mode(RuleMode::ParsingOnly);
        let r = UrlRule::compile(&spec).unwrap();
        assert!(r.create("post/create", &Params::new(), None).is_none());
    }

    #[test]
    fn test_host_rule() {
        let spec = RuleSpec::new("post/<id>", "post/view").with_host("http://<lang:en|fr>.example.com");
        let r = UrlRule::compile(&spec).unwrap();
        assert_eq!(
            r.create("post/view", &Params::new().with("id", 1).with("lang", "en"), None)
                .as_deref(),
            Some("http://en.example.com/post/1")
        );

        let (_, params) = r
            .parse("post/5", &Method::GET, Some("http://FR.example.com"), None)
            .unwrap();
        assert_eq!(params.get("lang"), Some("fr"));
        assert!(r.parse("post/5", &Method::GET, None, None).is_none());
    }

    #[test]
    fn test_compile_errors() {
        assert!(UrlRule::compile(&RuleSpec::new("post", "")).is_err());
        assert!(UrlRule::compile(&RuleSpec::new("<id:(>", "post/view")).is_err());
        assert!(UrlRule::compile(&RuleSpec::new("<id>/<id>", "post/view")).is_err());
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("", Some(".html")), Some(""));
        assert_eq!(strip_suffix(".html", Some(".html")), None);
        assert_eq!(strip_suffix("a.html", Some(".html")), Some("a"));
        assert_eq!(strip_suffix("a", None), Some("a"));
    }
}
