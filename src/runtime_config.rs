//! # Runtime Configuration
//!
//! Environment-variable configuration read once at startup.
//!
//! ## Environment Variables
//!
//! ### `TYPECART_MAX_BODY_BYTES`
//!
//! Largest request body a typed handler accepts. Accepts decimal (`1048576`)
//! or hexadecimal (`0x100000`). Larger bodies are recorded as a
//! `413 Payload Too Large` request error and the handler is not invoked.
//!
//! Default: `0x200000` (2 MiB)
//!
//! ### `TYPECART_DOCS_PATH` / `TYPECART_DOCS_UI_PATH`
//!
//! Routes used by [`Mux::with_docs`](crate::router::Mux::with_docs) for the
//! generated OpenAPI document and the interactive viewer.
//!
//! Defaults: `/openapi.json` and `/docs`
//!
//! Invalid values fall back to the defaults.
//!
//! ```rust
//! use typecart::runtime_config::CartConfig;
//!
//! let config = CartConfig::from_env();
//! assert!(config.max_body_bytes > 0);
//! ```

use std::env;

use once_cell::sync::Lazy;

const DEFAULT_MAX_BODY_BYTES: usize = 0x20_0000;
const DEFAULT_DOCS_PATH: &str = "/openapi.json";
const DEFAULT_DOCS_UI_PATH: &str = "/docs";

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Request body limit for typed handlers (default: 2 MiB / 0x200000)
    pub max_body_bytes: usize,
    /// Route serving the OpenAPI document as JSON
    pub docs_path: String,
    /// Route serving the documentation viewer
    pub docs_ui_path: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            docs_path: DEFAULT_DOCS_PATH.to_string(),
            docs_ui_path: DEFAULT_DOCS_UI_PATH.to_string(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_body_bytes = lookup("TYPECART_MAX_BODY_BYTES")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let docs_path = lookup("TYPECART_DOCS_PATH")
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_DOCS_PATH.to_string());
        let docs_ui_path = lookup("TYPECART_DOCS_UI_PATH")
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| DEFAULT_DOCS_UI_PATH.to_string());
        CartConfig {
            max_body_bytes,
            docs_path,
            docs_ui_path,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    let parsed = if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    };
    parsed.filter(|n| *n > 0)
}

static GLOBAL: Lazy<CartConfig> = Lazy::new(CartConfig::from_env);

/// Process-wide configuration, read from the environment on first use.
pub fn global() -> &'static CartConfig {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> CartConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), CartConfig::default());
        assert_eq!(CartConfig::default().max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_hex_and_decimal() {
        assert_eq!(
            config(&[("TYPECART_MAX_BODY_BYTES", "0x400")]).max_body_bytes,
            1024
        );
        assert_eq!(
            config(&[("TYPECART_MAX_BODY_BYTES", "2048")]).max_body_bytes,
            2048
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = config(&[
            ("TYPECART_MAX_BODY_BYTES", "lots"),
            ("TYPECART_DOCS_PATH", "openapi.json"),
        ]);
        assert_eq!(cfg.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(cfg.docs_path, "/openapi.json");
        assert_eq!(config(&[("TYPECART_MAX_BODY_BYTES", "0")]).max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_docs_paths() {
        let cfg = config(&[
            ("TYPECART_DOCS_PATH", "/spec.json"),
            ("TYPECART_DOCS_UI_PATH", "/ui"),
        ]);
        assert_eq!(cfg.docs_path, "/spec.json");
        assert_eq!(cfg.docs_ui_path, "/ui");
    }
}
