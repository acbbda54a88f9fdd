//! Shared type definitions for the suppliers client.
//!
//! Everything that crosses a crate boundary lives here: the wire shapes of
//! the supplier service, the search criteria built from form fields, the
//! two historical API revisions, and the products-field parser that both
//! the form controller and the CLI rely on.

use std::{error::Error, fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;

/// Identifier assigned by the supplier service.
///
/// The service has emitted both JSON numbers and JSON strings for ids across
/// revisions, so the client accepts either and echoes back whichever form it
/// received. Ids are never invented locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupplierId {
    Number(u64),
    Text(String),
}

impl SupplierId {
    /// Interpret a raw form-field value as an id.
    ///
    /// Returns `None` for blank input. All-digit input becomes a numeric id
    /// so it round-trips against servers that compare ids numerically;
    /// anything else is carried as text.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<u64>() {
            Ok(n) => Some(Self::Number(n)),
            Err(_) => Some(Self::Text(trimmed.to_string())),
        }
    }
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Identifier of a product carried by a supplier. Same number-or-string
/// wire shape as [`SupplierId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A supplier record as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub address: String,
    pub email: String,
    #[serde(default)]
    pub products: Vec<ProductId>,
}

impl Supplier {
    /// Products joined for display, e.g. `[1, 2]` renders as `"1, 2"`.
    pub fn products_display(&self) -> String {
        join_products(&self.products)
    }
}

/// Join product ids with `", "` the way the form field displays them.
pub fn join_products(products: &[ProductId]) -> String {
    products.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Payload for create and update requests. The id is never part of the
/// body; update targets it through the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub address: String,
    pub email: String,
    pub products: Vec<ProductId>,
}

/// Body of the add-products request (`POST {base}/{id}/products`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsPatch {
    pub products: Vec<ProductId>,
}

/// Error produced when a products form field cannot be read as a
/// comma-separated list of identifiers.
#[derive(Debug, ThisError)]
pub enum ProductsParseError {
    /// The field, wrapped in brackets, is not valid JSON.
    #[error("products must be a comma-separated list of ids: {0}")]
    Syntax(#[from] serde_json::Error),
    /// The field parsed, but an element is neither a number nor a string.
    #[error("unsupported product id value: {0}")]
    Element(String),
}

/// Parse a raw products form field into product ids.
///
/// The field is wrapped in array brackets and decoded as JSON, preserving
/// the contract the service's form page has always had: `"1, 2, 3"` yields
/// `[1, 2, 3]`, a blank field yields an empty list, and anything that does
/// not decode fails the whole operation before any request is made.
pub fn parse_products_field(raw: &str) -> Result<Vec<ProductId>, ProductsParseError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let wrapped = format!("[{}]", raw);
    let values: Vec<Value> = serde_json::from_str(&wrapped)?;
    values
        .into_iter()
        .map(|value| match value {
            Value::Number(n) => n
                .as_u64()
                .map(ProductId::Number)
                .ok_or_else(|| ProductsParseError::Element(n.to_string())),
            Value::String(s) => Ok(ProductId::Text(s)),
            other => Err(ProductsParseError::Element(other.to_string())),
        })
        .collect()
}

/// Ordered mapping of search fields to non-empty values.
///
/// Built from whichever form fields are filled in at search time and
/// discarded after the request. Field order is preserved so the resulting
/// query string is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    fields: IndexMap<String, String>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a criterion. Blank values are skipped entirely so empty form
    /// fields never appear in the query string.
    pub fn push(&mut self, field: &str, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.fields.insert(field.to_string(), trimmed.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Criteria in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The two historical revisions of the supplier service API.
///
/// They differ in the path the service is mounted under and in which field
/// of an error body carries the human-readable message. `Modern` is the
/// canonical contract; `Legacy` remains reachable through configuration for
/// servers that were never migrated.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum ApiRevision {
    #[default]
    Modern, // mounted at /api/suppliers, errors in "message"
    Legacy, // mounted at /suppliers, errors in "error"
}

impl ApiRevision {
    pub fn default_base_path(&self) -> &str {
        match self {
            Self::Modern => "/api/suppliers",
            Self::Legacy => "/suppliers",
        }
    }

    /// Name of the response-body field holding a server error message.
    pub fn error_field(&self) -> &str {
        match self {
            Self::Modern => "message",
            Self::Legacy => "error",
        }
    }
}

impl FromStr for ApiRevision {
    type Err = ParseRevisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "modern" | "v2" => Ok(Self::Modern),
            "legacy" | "v1" => Ok(Self::Legacy),
            _ => Err(ParseRevisionError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRevisionError;

impl fmt::Display for ParseRevisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid api revision; expected 'modern' or 'legacy'")
    }
}

impl Error for ParseRevisionError {}
