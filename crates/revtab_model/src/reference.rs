//! Cross-store object references.

use std::fmt;

use crate::error::{ModelError, ModelResult};

/// A link to an object in another context of the store.
///
/// References are encoded as `<context>/<identity>` when materialized into
/// a reference column. The identity part may itself contain slashes; only
/// the first separator splits the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    context: String,
    target: String,
}

impl Reference {
    /// Creates a reference to `target` inside `context`.
    pub fn new(context: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            target: target.into(),
        }
    }

    /// Parses the `<context>/<identity>` encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedReference`] if no separator is
    /// present or the context part is empty.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        match raw.split_once('/') {
            Some((context, target)) if !context.is_empty() && !target.is_empty() => {
                Ok(Self::new(context, target))
            }
            _ => Err(ModelError::malformed_reference(raw)),
        }
    }

    /// Returns the context id.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns the target identity.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.context, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_encodes_context_and_target() {
        let reference = Reference::new("testContext", "foo");
        assert_eq!(reference.to_string(), "testContext/foo");
    }

    #[test]
    fn parse_roundtrip() {
        let reference = Reference::parse("ctx/some/nested/id").unwrap();
        assert_eq!(reference.context(), "ctx");
        assert_eq!(reference.target(), "some/nested/id");
        assert_eq!(reference.to_string(), "ctx/some/nested/id");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Reference::parse("no-separator").is_err());
        assert!(Reference::parse("/id").is_err());
        assert!(Reference::parse("ctx/").is_err());
    }
}
