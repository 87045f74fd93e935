//! Deterministic SQL name derivation.
//!
//! Properties map to upper-cased column names; flattened list and map
//! entries carry ordinal suffixes. All derivation is pure so that the same
//! model shape always lands in the same columns.

/// Derives the column name for a plain property.
#[must_use]
pub fn column(property: &str) -> String {
    property.to_uppercase()
}

/// Derives the column name for the `index`-th element of a list property.
#[must_use]
pub fn list_column(property: &str, index: usize) -> String {
    format!("{}_{}", property.to_uppercase(), index)
}

/// Derives the key column name for the `index`-th entry of a map property.
#[must_use]
pub fn map_key_column(property: &str, index: usize) -> String {
    format!("{}_KEY_{}", property.to_uppercase(), index)
}

/// Derives the value column name for the `index`-th entry of a map property.
#[must_use]
pub fn map_value_column(property: &str, index: usize) -> String {
    format!("{}_VALUE_{}", property.to_uppercase(), index)
}
