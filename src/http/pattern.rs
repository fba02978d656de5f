//! Route path patterns.
//!
//! Syntax: literal segments, `:name` parameter segments, and an optional
//! trailing `*` that matches any remainder (captured as `wildcard`).
//! A trailing slash is not significant.

use std::collections::HashMap;

/// Parameter name under which a trailing `*` captures the remainder.
pub const WILDCARD: &str = "wildcard";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    wildcard: bool,
}

impl PathPattern {
    /// Compile `raw`. The error is a human-readable reason.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err("pattern must start with '/'".to_string());
        };

        let mut parts: Vec<&str> = split(rest);
        let mut wildcard = false;
        if parts.last() == Some(&"*") {
            parts.pop();
            wildcard = true;
        }

        let mut segments = Vec::with_capacity(parts.len());
        for part in parts {
            if part.contains('*') {
                return Err(format!("wildcard only allowed as final segment, found '{part}'"));
            }
            if part.contains(['{', '}']) {
                return Err(format!("braces are not allowed, found '{part}'"));
            }
            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(format!("invalid parameter name '{name}'"));
                }
                if name == WILDCARD
                    || segments.contains(&Segment::Param(name.to_string()))
                {
                    return Err(format!("duplicate parameter '{name}'"));
                }
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            wildcard,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning captured parameters.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts = split(path.strip_prefix('/').unwrap_or(path));
        if parts.len() < self.segments.len()
            || (!self.wildcard && parts.len() != self.segments.len())
        {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }

        if self.wildcard {
            let remainder = parts[self.segments.len()..].join("/");
            params.insert(WILDCARD.to_string(), remainder);
        }
        Some(params)
    }
}

fn split(path: &str) -> Vec<&str> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/a/b").unwrap();
        assert!(pattern.matches("/a/b").is_some());
        assert!(pattern.matches("/a/b/").is_some());
        assert!(pattern.matches("/a").is_none());
        assert!(pattern.matches("/a/b/c").is_none());
    }

    #[test]
    fn test_root() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/x").is_none());
    }

    #[test]
    fn test_params_captured() {
        let pattern = PathPattern::parse("/users/:id/posts/:post_id").unwrap();
        let params = pattern.matches("/users/7/posts/42").unwrap();
        assert_eq!(params["id"], "7");
        assert_eq!(params["post_id"], "42");
        assert!(pattern.matches("/users//posts/42").is_none());
    }

    #[test]
    fn test_wildcard_remainder() {
        let pattern = PathPattern::parse("/static/*").unwrap();
        assert_eq!(pattern.matches("/static/css/site.css").unwrap()[WILDCARD], "css/site.css");
        assert_eq!(pattern.matches("/static").unwrap()[WILDCARD], "");
        assert!(pattern.matches("/other/x").is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::parse("relative").is_err());
        assert!(PathPattern::parse("/a*/b").is_err());
        assert!(PathPattern::parse("/*/b").is_err());
        assert!(PathPattern::parse("/{id}").is_err());
        assert!(PathPattern::parse("/:").is_err());
        assert!(PathPattern::parse("/:a/:a").is_err());
    }
}
