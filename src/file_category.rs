//! Extension-based categorisation of files.
//!
//! Maps the extension of a filename to a configured category label, falling
//! back to a default category for unknown or missing extensions.
//!
//! # Examples
//!
//! ```
//! use classifier::file_category::CategoryResolver;
//!
//! let mut resolver = CategoryResolver::new("others");
//! resolver.add_extension_mapping(".JPG", "images");
//! assert_eq!(resolver.category_for("holiday.jpg"), "images");
//! assert_eq!(resolver.category_for("README"), "others");
//! ```
use serde::Deserialize;
use std::collections::HashMap;

/// Category used when the configuration leaves `default_category` blank.
pub const FALLBACK_CATEGORY: &str = "others";

/// A named bucket and the extensions that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Directory name under the destination, e.g. "images".
    pub name: String,
    /// Extensions claimed by this category, matched case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Maps lowercased extensions to category names.
///
/// Built once from the configuration and read-only afterwards.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    default_category: String,
    extension_map: HashMap<String, String>,
}

impl CategoryResolver {
    /// Creates an empty resolver. A blank default becomes [`FALLBACK_CATEGORY`].
    pub fn new(default_category: &str) -> Self {
        let default_category = if default_category.trim().is_empty() {
            FALLBACK_CATEGORY.to_string()
        } else {
            default_category.to_string()
        };

        Self {
            default_category,
            extension_map: HashMap::new(),
        }
    }

    /// Builds a resolver from an ordered list of categories.
    ///
    /// When two categories claim the same extension the later one wins.
    pub fn from_categories(categories: &[Category], default_category: &str) -> Self {
        let mut resolver = Self::new(default_category);
        for category in categories {
            for ext in &category.extensions {
                resolver.add_extension_mapping(ext, &category.name);
            }
        }
        resolver
    }

    /// Adds an extension to category mapping.
    ///
    /// The extension is lowercased and a leading dot is stripped; empty
    /// extensions are ignored.
    pub fn add_extension_mapping(&mut self, ext: &str, category: &str) {
        let ext = ext.to_lowercase();
        let clean = ext.strip_prefix('.').unwrap_or(&ext);
        if clean.is_empty() {
            return;
        }
        self.extension_map
            .insert(clean.to_string(), category.to_string());
    }

    /// Returns the default category name.
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Maps an extension to its category, if any is configured.
    pub fn extension_to_category(&self, ext: &str) -> Option<&str> {
        self.extension_map
            .get(&ext.to_lowercase())
            .map(String::as_str)
    }

    /// Determines the category for a filename.
    ///
    /// The extension is everything after the last '.', so `.bashrc` has the
    /// extension `bashrc` and `archive.` has none.
    pub fn category_for(&self, filename: &str) -> &str {
        let ext = extension_of(filename);
        if ext.is_empty() {
            return &self.default_category;
        }

        self.extension_to_category(&ext)
            .unwrap_or(self.default_category.as_str())
    }
}

/// Lowercased substring after the last '.', or empty when there is no dot.
fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}
