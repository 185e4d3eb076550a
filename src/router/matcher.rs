use std::sync::Arc;

use regex::Regex;

use super::route::ParamVec;
use crate::Error;

/// A compiled route pattern.
///
/// `{name}` segments capture one path segment, a trailing `*` segment
/// captures the remainder of the path (including its leading `/`).
#[derive(Debug, Clone)]
pub(crate) struct PathMatcher {
    regex: Regex,
    param_names: Vec<Arc<str>>,
    wildcard: bool,
    static_segments: usize,
}

/// Result of matching a path against a [`PathMatcher`].
#[derive(Debug, Default)]
pub(crate) struct PathMatch {
    pub params: ParamVec,
    /// Unmatched tail for wildcard patterns, always starting with `/`
    pub rest: Option<String>,
}

impl PathMatcher {
    /// Compile `pattern` into an anchored regex.
    pub(crate) fn compile(pattern: &str) -> Result<Self, Error> {
        let invalid = |reason: String| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if !pattern.is_empty() && !pattern.starts_with('/') {
            return Err(invalid("pattern must start with '/'".to_string()));
        }

        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        let mut param_names = Vec::with_capacity(pattern.matches('{').count());
        let mut wildcard = false;
        let mut static_segments = 0;

        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        for segment in &segments {
            if wildcard {
                return Err(invalid("'*' must be the last segment".to_string()));
            }
            if *segment == "*" {
                wildcard = true;
                source.push_str("(/.*)?");
            } else if segment.starts_with('{') && segment.ends_with('}') {
                let name = segment.trim_start_matches('{').trim_end_matches('}');
                if name.is_empty() || name.contains(['{', '}', '/']) {
                    return Err(invalid(format!("bad parameter segment {segment:?}")));
                }
                source.push_str("/([^/]+)");
                param_names.push(Arc::from(name));
            } else if segment.contains(['{', '}']) {
                return Err(invalid(format!("bad parameter segment {segment:?}")));
            } else {
                source.push('/');
                source.push_str(&regex::escape(segment));
                static_segments += 1;
            }
        }

        if segments.is_empty() {
            source.push('/');
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            regex,
            param_names,
            wildcard,
            static_segments,
        })
    }

    /// Higher sorts first: more literal segments, then non-wildcard.
    pub(crate) fn specificity(&self) -> (usize, bool) {
        (self.static_segments, !self.wildcard)
    }

    pub(crate) fn matches(&self, path: &str) -> Option<PathMatch> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(m) = caps.get(i + 1) {
                let value = urlencoding::decode(m.as_str())
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| m.as_str().to_string());
                params.push((Arc::clone(name), value));
            }
        }
        let rest = self.wildcard.then(|| {
            caps.get(self.param_names.len() + 1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "/".to_string())
        });
        Some(PathMatch { params, rest })
    }
}
