//! Commits and the commit builder.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use revtab_model::Model;
use uuid::Uuid;

/// A point in time as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp from epoch milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Returns the raw epoch milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ts:{}", self.0)
    }
}

/// The kind of a commit operation, as recorded in the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// A new row is added to the head table.
    Insert,
    /// An existing head row is overwritten.
    Update,
    /// A head row is removed.
    Delete,
}

impl OperationKind {
    /// Returns the value stored in the `REV_OPERATION` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationKind::Insert => "INSERT",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Insert the model as a new row.
    Insert(Model),
    /// Update the row matched by the model's identity.
    Update(Model),
    /// Delete the row matched by the model's identity.
    Delete(Model),
}

impl Operation {
    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert(_) => OperationKind::Insert,
            Operation::Update(_) => OperationKind::Update,
            Operation::Delete(_) => OperationKind::Delete,
        }
    }

    /// Returns the model the operation applies to.
    #[must_use]
    pub fn model(&self) -> &Model {
        match self {
            Operation::Insert(model) | Operation::Update(model) | Operation::Delete(model) => {
                model
            }
        }
    }
}

/// An immutable, metadata-tagged batch of operations.
///
/// All rows produced by one commit share the same timestamp; the history
/// table groups an audit event by that timestamp and the commit id.
/// Commits are built once via [`CommitBuilder`] and submitted to the
/// engine; re-submitting the same commit produces a second history event.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexCommit {
    id: Uuid,
    timestamp: Timestamp,
    context: String,
    user: String,
    domain: String,
    connector: String,
    instance: String,
    operations: Vec<Operation>,
}

impl IndexCommit {
    /// Returns the unique commit id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the commit timestamp shared by every row of the batch.
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the context id the commit was made in.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns the acting user.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the domain id.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the connector id.
    #[must_use]
    pub fn connector(&self) -> &str {
        &self.connector
    }

    /// Returns the connector instance id.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Returns the operations in submission order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

/// Fluent builder for [`IndexCommit`].
///
/// ```
/// use revtab_core::CommitBuilder;
/// use revtab_model::Model;
///
/// let commit = CommitBuilder::new()
///     .context("testContext")
///     .user("testUser")
///     .insert(Model::new("TestModel").with_id("testId", "foo"))
///     .build();
///
/// assert_eq!(commit.operations().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CommitBuilder {
    context: String,
    user: String,
    domain: String,
    connector: String,
    instance: String,
    timestamp: Option<Timestamp>,
    operations: Vec<Operation>,
}

impl CommitBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the context id of the commit.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Sets the acting user of the commit.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Sets the domain id of the commit.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sets the connector id of the commit.
    #[must_use]
    pub fn connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = connector.into();
        self
    }

    /// Sets the connector instance id of the commit.
    #[must_use]
    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// Overrides the commit timestamp.
    ///
    /// Without this, `build` stamps the current wall-clock time.
    #[must_use]
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Marks the given model for insertion.
    #[must_use]
    pub fn insert(mut self, model: Model) -> Self {
        self.operations.push(Operation::Insert(model));
        self
    }

    /// Marks the given model for updating.
    #[must_use]
    pub fn update(mut self, model: Model) -> Self {
        self.operations.push(Operation::Update(model));
        self
    }

    /// Marks the given model for deletion.
    #[must_use]
    pub fn delete(mut self, model: Model) -> Self {
        self.operations.push(Operation::Delete(model));
        self
    }

    /// Builds the commit, assigning its id and timestamp.
    #[must_use]
    pub fn build(self) -> IndexCommit {
        IndexCommit {
            id: Uuid::new_v4(),
            timestamp: self.timestamp.unwrap_or_else(Timestamp::now),
            context: self.context,
            user: self.user,
            domain: self.domain,
            connector: self.connector,
            instance: self.instance,
            operations: self.operations,
        }
    }
}
