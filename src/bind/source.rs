use std::sync::Arc;

use http::HeaderMap;

use super::{Binding, Source};

/// A named request location the binder can read raw strings from.
pub trait SourceProvider {
    /// Which `#[bind(...)]` tag this provider answers for.
    fn source(&self) -> Source;

    /// All raw values stored under `binding.key`, or `None` when absent.
    fn lookup(&self, binding: &Binding) -> Option<Vec<String>>;
}

/// Path parameters captured by the router.
#[derive(Debug, Clone, Copy)]
pub struct PathValues<'a> {
    params: &'a [(Arc<str>, String)],
}

impl<'a> PathValues<'a> {
    pub fn new(params: &'a [(Arc<str>, String)]) -> Self {
        Self { params }
    }
}

impl SourceProvider for PathValues<'_> {
    fn source(&self) -> Source {
        Source::Path
    }

    fn lookup(&self, binding: &Binding) -> Option<Vec<String>> {
        // Last write wins when a pattern repeats a name
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == binding.key)
            .map(|(_, v)| vec![v.clone()])
    }
}

/// `application/x-www-form-urlencoded` pairs from a query string or a form body.
#[derive(Debug, Clone)]
pub struct UrlValues {
    source: Source,
    pairs: Vec<(String, String)>,
}

impl UrlValues {
    /// Parse the query component of a request URI.
    pub fn query(query: Option<&str>) -> Self {
        Self::parse(Source::Query, query.unwrap_or_default().as_bytes())
    }

    /// Parse a urlencoded request body.
    pub fn form(body: &[u8]) -> Self {
        Self::parse(Source::Form, body)
    }

    /// A form provider with no values, used when the body is not urlencoded.
    pub fn empty_form() -> Self {
        Self {
            source: Source::Form,
            pairs: Vec::new(),
        }
    }

    fn parse(source: Source, input: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { source, pairs }
    }

    /// Whether no pair was parsed.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl SourceProvider for UrlValues {
    fn source(&self) -> Source {
        self.source
    }

    fn lookup(&self, binding: &Binding) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .pairs
            .iter()
            .filter(|(k, _)| k == binding.key)
            .map(|(_, v)| v.clone())
            .collect();
        (!values.is_empty()).then_some(values)
    }
}

/// Request headers, answering either the `header` or the `meta` tag.
#[derive(Debug, Clone, Copy)]
pub struct HeaderValues<'a> {
    source: Source,
    headers: &'a HeaderMap,
}

impl<'a> HeaderValues<'a> {
    pub fn header(headers: &'a HeaderMap) -> Self {
        Self {
            source: Source::Header,
            headers,
        }
    }

    pub fn meta(headers: &'a HeaderMap) -> Self {
        Self {
            source: Source::Meta,
            headers,
        }
    }
}

impl SourceProvider for HeaderValues<'_> {
    fn source(&self) -> Source {
        self.source
    }

    fn lookup(&self, binding: &Binding) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .headers
            .get_all(binding.key)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        (!values.is_empty()).then_some(values)
    }
}
