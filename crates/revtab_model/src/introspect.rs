//! Schema introspection of model instances.
//!
//! [`introspect`] derives the relational shape of a model instance: one
//! column per scalar property, ordinally-suffixed columns for list and map
//! properties, a foreign-key column per nested sub-model, and a text column
//! per reference property. [`flatten`] performs the matching value
//! extraction for DML.
//!
//! Properties without type information (a `Null` scalar, a `Null` list
//! element) are pruned from the derived schema; flattening still emits
//! them so an engine can write NULL into columns known from earlier
//! instances.

use revtab_schema::{Column, ColumnSet, ColumnType};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, PropertyRole};
use crate::names;
use crate::value::Value;

/// A foreign-key edge from a model to a nested sub-model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    property: String,
    column: String,
    target_type: String,
}

impl Dependency {
    /// Returns the property name carrying the sub-model.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Returns the derived foreign-key column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the referenced model type name.
    #[must_use]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }
}

/// The relational shape derived from one model instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    type_name: String,
    identity_column: String,
    columns: ColumnSet,
    dependencies: Vec<Dependency>,
}

impl ModelSchema {
    /// Returns the model type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the column name of the identity property.
    #[must_use]
    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    /// Returns the derived data columns.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Returns the sub-model dependency edges.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

/// A model instance flattened into column-value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    type_name: String,
    identity_column: String,
    entries: Vec<(String, Value)>,
}

impl FlatRecord {
    /// Returns the model type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the column name of the identity property.
    #[must_use]
    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    /// Returns the identity value.
    #[must_use]
    pub fn identity_value(&self) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == self.identity_column)
            .map(|(_, value)| value)
    }

    /// Returns the value bound for the given column, if any.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns all column-value pairs in derivation order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }
}

/// Derives the relational schema of a model instance.
///
/// # Errors
///
/// Fails with [`ModelError::MissingIdentity`] or
/// [`ModelError::DuplicateIdentity`] when the identity rule is violated,
/// and [`ModelError::UnsupportedNesting`] when a list or map nests a
/// composite value.
pub fn introspect(model: &Model) -> ModelResult<ModelSchema> {
    let mut columns = ColumnSet::new();
    let mut dependencies = Vec::new();
    let identity_column = walk(model, &mut |column, value| {
        match scalar_type(value) {
            Some(ty) => {
                columns.add(Column::new(column, ty))?;
            }
            None => {
                debug!(model = model.type_name(), column, "pruning untyped column");
            }
        }
        Ok(())
    })?;

    for entry in model.entries() {
        match entry.value() {
            Value::Model(sub) => dependencies.push(Dependency {
                property: entry.key().to_string(),
                column: names::column(entry.key()),
                target_type: sub.type_name().to_string(),
            }),
            Value::List(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    if let Value::Model(sub) = element {
                        dependencies.push(Dependency {
                            property: entry.key().to_string(),
                            column: names::list_column(entry.key(), index),
                            target_type: sub.type_name().to_string(),
                        });
                    }
                }
            }
            Value::Map(pairs) => {
                for (index, (_, nested)) in pairs.iter().enumerate() {
                    if let Value::Model(sub) = nested {
                        dependencies.push(Dependency {
                            property: entry.key().to_string(),
                            column: names::map_value_column(entry.key(), index),
                            target_type: sub.type_name().to_string(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(ModelSchema {
        type_name: model.type_name().to_string(),
        identity_column,
        columns,
        dependencies,
    })
}

/// Flattens a model instance into column-value pairs for DML.
///
/// Reference properties are resolved into their encoded text column and
/// the raw entry is consumed; sub-model properties are resolved into the
/// sub-model's identity value.
///
/// # Errors
///
/// Same failure modes as [`introspect`].
pub fn flatten(model: &Model) -> ModelResult<FlatRecord> {
    let mut entries = Vec::new();
    let identity_column = walk(model, &mut |column, value| {
        entries.push((column.to_string(), value.clone()));
        Ok(())
    })?;

    Ok(FlatRecord {
        type_name: model.type_name().to_string(),
        identity_column,
        entries,
    })
}

/// Visits every derived column of a model with its scalar value.
///
/// Returns the identity column name, enforcing the identity rule along
/// the way.
fn walk(
    model: &Model,
    visit: &mut dyn FnMut(&str, &Value) -> ModelResult<()>,
) -> ModelResult<String> {
    let mut identity: Option<String> = None;

    for entry in model.entries() {
        let key = entry.key();

        if entry.role() == PropertyRole::Identity {
            if !entry.value().is_scalar() {
                return Err(ModelError::unsupported_nesting(model.type_name(), key));
            }
            match &identity {
                Some(first) => {
                    return Err(ModelError::duplicate_identity(
                        model.type_name(),
                        first.clone(),
                        key,
                    ));
                }
                None => identity = Some(key.to_string()),
            }
        }

        match entry.value() {
            Value::List(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    let leaf = resolve(model.type_name(), key, element)?;
                    visit(&names::list_column(key, index), leaf)?;
                }
            }
            Value::Map(pairs) => {
                for (index, (map_key, map_value)) in pairs.iter().enumerate() {
                    let key_value = Value::Text(map_key.clone());
                    visit(&names::map_key_column(key, index), &key_value)?;
                    let leaf = resolve(model.type_name(), key, map_value)?;
                    visit(&names::map_value_column(key, index), leaf)?;
                }
            }
            other => {
                let leaf = resolve(model.type_name(), key, other)?;
                visit(&names::column(key), leaf)?;
            }
        }
    }

    identity
        .map(|key| names::column(&key))
        .ok_or_else(|| ModelError::missing_identity(model.type_name()))
}

/// Resolves a property value to the scalar that lands in its column.
///
/// Sub-models resolve to their identity value; composites nested below
/// the first level cannot be flattened.
fn resolve<'a>(model_type: &str, property: &str, value: &'a Value) -> ModelResult<&'a Value> {
    match value {
        Value::Model(sub) => sub
            .identity()
            .map(|(_, identity)| identity)
            .ok_or_else(|| ModelError::missing_identity(sub.type_name())),
        Value::List(_) | Value::Map(_) => {
            Err(ModelError::unsupported_nesting(model_type, property))
        }
        scalar => Ok(scalar),
    }
}

/// Maps a scalar value to its semantic column type.
fn scalar_type(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::Int(_) => Some(ColumnType::BigInt),
        Value::Float(_) => Some(ColumnType::Double),
        Value::Text(_) => Some(ColumnType::Varchar),
        Value::Timestamp(_) => Some(ColumnType::Timestamp),
        Value::Null | Value::List(_) | Value::Map(_) | Value::Model(_) => None,
    }
}
