use crate::router::{Route, Routes, ANY_METHOD};
use crate::Error;

/// Visit every `(method, pattern, route)` reachable from `routes`.
///
/// Mounted routers are descended into with their prefix joined onto the
/// child patterns, so the visitor always sees full, normalized patterns.
/// Catch-all handlers registered under `*` are not visited.
///
/// # Errors
///
/// Stops at the first error returned by `visit`.
pub fn walk<F>(routes: &dyn Routes, visit: &mut F) -> Result<(), Error>
where
    F: FnMut(&str, &str, &Route) -> Result<(), Error>,
{
    walk_prefixed(routes, "", visit)
}

fn walk_prefixed<F>(routes: &dyn Routes, prefix: &str, visit: &mut F) -> Result<(), Error>
where
    F: FnMut(&str, &str, &Route) -> Result<(), Error>,
{
    for entry in routes.routes() {
        let joined = format!("{prefix}{}", entry.pattern);
        if let Some(sub) = entry.sub_routes {
            // child patterns start with '/', drop the mount wildcard first
            let base = joined.strip_suffix("/*").unwrap_or(&joined);
            walk_prefixed(sub, base, visit)?;
            continue;
        }
        let pattern = normalize_pattern(&joined);
        for (method, route) in entry.handlers {
            if method == ANY_METHOD {
                continue;
            }
            visit(method, &pattern, route)?;
        }
    }
    Ok(())
}

/// Clean a concatenated route pattern.
///
/// Collapses `/*/` mount boundaries and doubled slashes, drops a trailing
/// `/` and maps the empty pattern to `/`. A trailing `/*` belongs to the
/// handler's own pattern and is kept.
pub fn normalize_pattern(pattern: &str) -> String {
    let mut out = pattern.to_string();
    while out.contains("/*/") {
        out = out.replace("/*/", "/");
    }
    while out.contains("//") {
        out = out.replace("//", "/");
    }
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pattern() {
        assert_eq!(normalize_pattern(""), "/");
        assert_eq!(normalize_pattern("/"), "/");
        assert_eq!(normalize_pattern("/api/*/items"), "/api/items");
        assert_eq!(normalize_pattern("/api//items/"), "/api/items");
        assert_eq!(normalize_pattern("/shops/{shop}/"), "/shops/{shop}");
        assert_eq!(normalize_pattern("/files/*"), "/files/*");
        assert_eq!(normalize_pattern("/api/*/files/*"), "/api/files/*");
        assert_eq!(normalize_pattern("/a/*/*/b"), "/a/b");
    }
}
