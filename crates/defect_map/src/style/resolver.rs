//! Style resolution by default inheritance.
use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::style::{StyleId, StyleOptions, DEFAULT_STYLE};

/// Resolves style names against a set of declared styles.
///
/// The effective options of a style are the `default` style's options with the
/// named style's options written on top. A missing `default` style is an empty base.
#[derive(Clone, Copy, Debug)]
pub struct StyleResolver<'a> {
    styles: &'a HashMap<StyleId, StyleOptions>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(styles: &'a HashMap<StyleId, StyleOptions>) -> Self {
        Self { styles }
    }

    /// Options every style inherits.
    pub fn base(&self) -> StyleOptions {
        self.styles.get(DEFAULT_STYLE).cloned().unwrap_or_default()
    }

    /// Resolves `name` to its fully merged option set.
    pub fn resolve(&self, name: &str) -> Result<StyleOptions> {
        let base = self.base();
        let overlay = match self.styles.get(name) {
            Some(overlay) => overlay,
            None if name == DEFAULT_STYLE => return Ok(base),
            None => {
                return Err(Error::UnknownStyle {
                    id: name.to_string(),
                })
            }
        };

        let resolved = base.merged_with(overlay);
        debug!("Resolved style '{}' with {} options.", name, resolved.len());
        Ok(resolved)
    }
}
