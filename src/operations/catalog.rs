//! Operation catalog: descriptive metadata for every built-in operation.
//!
//! Runtime dispatch goes through [`Operation`]; the catalog exists for
//! listing, searching and documenting what a recipe can contain.

use crate::core::config::CookConfig;
use crate::operations::Operation;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category for grouping operations in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Colour adjustments (modulate, contrast, normalize)
    Color,
    /// Codec degradation
    Compression,
    /// Geometric resampling
    Transform,
    /// Edge detection
    Edge,
    /// Noise injection
    Noise,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Color => "Color",
            Category::Compression => "Compression",
            Category::Transform => "Transform",
            Category::Edge => "Edge",
            Category::Noise => "Noise",
        }
    }
}

/// Description of an operation's numeric parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name as shown to users.
    pub name: String,
    /// Explicit values are clamped into `[min, max]`.
    pub min: i64,
    /// Upper clamp bound.
    pub max: i64,
    /// Range drawn from when the parameter is omitted, at full strength.
    pub random: (i64, i64),
}

/// Metadata for one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationInfo {
    /// The operation this entry describes.
    pub operation: Operation,
    /// Recipe token, e.g. `-edge`.
    pub token: String,
    /// Human-readable name.
    pub name: String,
    /// What the operation does.
    pub description: String,
    /// Listing group.
    pub category: Category,
    /// Numeric parameter, if any.
    pub parameter: Option<ParameterInfo>,
}

/// Catalog of all operations, indexed by token in catalog order.
#[derive(Debug, Clone)]
pub struct OperationCatalog {
    entries: IndexMap<&'static str, OperationInfo>,
}

impl OperationCatalog {
    /// Build the catalog. Random ranges reflect `config` (noise amount).
    pub fn new(config: &CookConfig) -> Self {
        let entries = Operation::ALL
            .into_iter()
            .map(|op| (op.token(), describe(op, config)))
            .collect();
        Self { entries }
    }

    /// Get an entry by token.
    pub fn get(&self, token: &str) -> Option<&OperationInfo> {
        self.entries.get(token)
    }

    /// Check if a token is in the catalog.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// All tokens in catalog order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().copied()
    }

    /// All entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationInfo> {
        self.entries.values()
    }

    /// Entries in one category.
    pub fn by_category(&self, category: Category) -> Vec<&OperationInfo> {
        self.iter().filter(|info| info.category == category).collect()
    }

    /// Search by token, name or description.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(token, info)| {
                token.contains(&query)
                    || info.name.to_lowercase().contains(&query)
                    || info.description.to_lowercase().contains(&query)
            })
            .map(|(token, _)| *token)
            .collect()
    }

    /// Entries grouped by category for display.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&OperationInfo>> {
        let mut grouped: IndexMap<Category, Vec<&OperationInfo>> = IndexMap::new();
        for info in self.entries.values() {
            grouped.entry(info.category).or_default().push(info);
        }
        grouped
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for the built-in catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperationCatalog {
    fn default() -> Self {
        Self::new(&CookConfig::default())
    }
}

fn describe(op: Operation, config: &CookConfig) -> OperationInfo {
    let (name, description, category, parameter_name) = match op {
        Operation::Modulate => (
            "Modulate",
            "Scale saturation by factor/100 toward a luminance grey, then add a brightness offset",
            Category::Color,
            "factor",
        ),
        Operation::Quality => (
            "Quality",
            "Re-encode through a lossy codec at (factor/100)^2 quality and decode back",
            Category::Compression,
            "factor",
        ),
        Operation::Contrast => (
            "Contrast",
            "Linear contrast stretch pivoting on 128",
            Category::Color,
            "value",
        ),
        Operation::Resize => (
            "Resize",
            "Shrink to percent% width with nearest sampling, then scale back up for blocky pixels",
            Category::Transform,
            "percent",
        ),
        Operation::Edge => (
            "Edge",
            "3x3 Laplacian edge detector over interior pixels",
            Category::Edge,
            "",
        ),
        Operation::Noise => (
            "Noise",
            "Add uniform noise in [-amount, amount] to R, G and B",
            Category::Noise,
            "amount",
        ),
        Operation::Normalize => (
            "Normalize",
            "Stretch the luminance range to 0-255",
            Category::Color,
            "",
        ),
    };

    let parameter = op
        .parameter_domain()
        .zip(op.random_range(config))
        .map(|(domain, random)| ParameterInfo {
            name: parameter_name.to_string(),
            min: *domain.start(),
            max: *domain.end(),
            random: (*random.start(), *random.end()),
        });

    OperationInfo {
        operation: op,
        token: op.token().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        parameter,
    }
}
