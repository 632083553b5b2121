//! Tile URL templates.
//!
//! Templates use the slippy map placeholders `{z}`, `{x}`, `{y}` and an
//! optional `{s}` subdomain, e.g. `http://{s}.tile.osm.org/{z}/{x}/{y}.png`.
//! The subdomain rotates over the configured list by `(x + y) % n`, which
//! spreads neighbouring tiles over different hosts.

use thiserror::Error;

use crate::coord::TileCoord;

/// Default tile server.
pub const DEFAULT_URL_TEMPLATE: &str = "http://{s}.tile.osm.org/{z}/{x}/{y}.png";

/// Default values for the `{s}` placeholder.
pub const DEFAULT_SUBDOMAINS: &[&str] = &["a", "b", "c"];

/// Errors from template validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("URL template '{template}' is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },

    #[error("URL template '{0}' uses {{s}} but no subdomains are configured")]
    NoSubdomains(String),
}

/// Builds tile URLs from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate {
    template: String,
    subdomains: Vec<String>,
    tms: bool,
}

impl TileUrlTemplate {
    /// Creates a validated template.
    pub fn new(
        template: impl Into<String>,
        subdomains: Vec<String>,
        tms: bool,
    ) -> Result<Self, TemplateError> {
        let template = template.into();

        for placeholder in ["{z}", "{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(TemplateError::MissingPlaceholder {
                    template,
                    placeholder,
                });
            }
        }
        if template.contains("{s}") && subdomains.is_empty() {
            return Err(TemplateError::NoSubdomains(template));
        }

        Ok(Self {
            template,
            subdomains,
            tms,
        })
    }

    /// Builds the URL for `tile`.
    ///
    /// For TMS servers the row is flipped before substitution; the cache key
    /// always uses the slippy map row.
    pub fn url_for(&self, tile: &TileCoord) -> String {
        let addressed = if self.tms { tile.flip_y() } else { *tile };

        let mut url = self
            .template
            .replace("{z}", &addressed.zoom.to_string())
            .replace("{x}", &addressed.x.to_string())
            .replace("{y}", &addressed.y.to_string());

        if !self.subdomains.is_empty() {
            let index = (u64::from(tile.x) + u64::from(tile.y)) % self.subdomains.len() as u64;
            url = url.replace("{s}", &self.subdomains[index as usize]);
        }
        url
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }

    pub fn is_tms(&self) -> bool {
        self.tms
    }
}

impl Default for TileUrlTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_URL_TEMPLATE.to_string(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            tms: false,
        }
    }
}
