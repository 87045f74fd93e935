//! Schemaless model instances.

use crate::reference::Reference;
use crate::value::Value;

/// The role a property plays within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyRole {
    /// The model's identity property.
    Identity,
    /// A regular data property.
    Data,
    /// A cross-store reference, encoded as `<context>/<identity>`.
    Reference,
}

/// A single property of a model instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    key: String,
    value: Value,
    role: PropertyRole,
}

impl ModelEntry {
    /// Returns the property name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the property value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the property role.
    #[must_use]
    pub const fn role(&self) -> PropertyRole {
        self.role
    }
}

/// A schemaless, typed model instance.
///
/// A model is an ordered bag of properties under a type name. Exactly one
/// property should be declared as identity via [`Model::with_id`]; the
/// identity rule is enforced at introspection time so that instances can
/// be assembled incrementally.
///
/// ```
/// use revtab_model::Model;
///
/// let sub = Model::new("SubTestModel").with_id("id", 11i64);
/// let model = Model::new("TestModel")
///     .with_id("testId", "foo")
///     .with("testInteger", 1i64)
///     .with("subModel", sub);
/// assert_eq!(model.type_name(), "TestModel");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    type_name: String,
    entries: Vec<ModelEntry>,
}

impl Model {
    /// Creates an empty model of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            entries: Vec::new(),
        }
    }

    /// Adds the identity property.
    #[must_use]
    pub fn with_id(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(ModelEntry {
            key: key.into(),
            value: value.into(),
            role: PropertyRole::Identity,
        });
        self
    }

    /// Adds a data property.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(ModelEntry {
            key: key.into(),
            value: value.into(),
            role: PropertyRole::Data,
        });
        self
    }

    /// Adds a reference property.
    ///
    /// The raw reference entry is consumed during flattening; the
    /// materialized record carries only the encoded reference column.
    #[must_use]
    pub fn with_reference(mut self, key: impl Into<String>, reference: Reference) -> Self {
        self.entries.push(ModelEntry {
            key: key.into(),
            value: Value::Text(reference.to_string()),
            role: PropertyRole::Reference,
        });
        self
    }

    /// Returns the model's type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns all property entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Returns the value of the named property, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// Returns the identity property as a `(name, value)` pair.
    ///
    /// Returns the first identity entry; the introspector rejects models
    /// carrying more than one.
    #[must_use]
    pub fn identity(&self) -> Option<(&str, &Value)> {
        self.entries
            .iter()
            .find(|e| e.role == PropertyRole::Identity)
            .map(|e| (e.key.as_str(), &e.value))
    }

    /// Iterates the nested sub-models of this instance.
    pub fn sub_models(&self) -> impl Iterator<Item = &Model> {
        self.entries.iter().filter_map(|e| e.value.as_model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_lookup() {
        let model = Model::new("TestModel")
            .with_id("testId", "foo")
            .with("testInteger", 1i64);

        let (key, value) = model.identity().unwrap();
        assert_eq!(key, "testId");
        assert_eq!(value, &Value::Text("foo".to_string()));
    }

    #[test]
    fn get_by_key() {
        let model = Model::new("TestModel")
            .with_id("testId", "foo")
            .with("testInteger", 1i64);

        assert_eq!(model.get("testInteger"), Some(&Value::Int(1)));
        assert_eq!(model.get("missing"), None);
    }

    #[test]
    fn sub_models_are_discoverable() {
        let sub = Model::new("SubTestModel").with_id("id", 11i64);
        let model = Model::new("TestModel")
            .with_id("testId", "foo")
            .with("subModel", sub.clone());

        let subs: Vec<&Model> = model.sub_models().collect();
        assert_eq!(subs, vec![&sub]);
    }

    #[test]
    fn reference_entry_is_encoded() {
        let model = Model::new("Widget")
            .with_id("id", "w1")
            .with_reference("blueprint", Reference::new("ctx", "b1"));

        assert_eq!(
            model.get("blueprint"),
            Some(&Value::Text("ctx/b1".to_string()))
        );
        assert_eq!(model.entries()[1].role(), PropertyRole::Reference);
    }
}
