//! Columns, semantic column types and column options.

use std::fmt;

/// Semantic SQL type of a column.
///
/// These are dialect-independent; a driver maps each variant to whatever
/// storage type its database offers. `Varchar` is unbounded text and
/// `Timestamp` carries millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Boolean flag.
    Boolean,
    /// 16-bit signed integer.
    SmallInt,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit floating point number.
    Float,
    /// 64-bit floating point number.
    Double,
    /// Unbounded UTF-8 text.
    Varchar,
    /// Point in time, millisecond precision.
    Timestamp,
    /// Universally unique identifier.
    Uuid,
}

impl ColumnType {
    /// Returns the stable name of this type, used for durable registration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Uuid => "UUID",
        }
    }

    /// Resolves a stable type name back to a `ColumnType`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BOOLEAN" => Some(ColumnType::Boolean),
            "SMALLINT" => Some(ColumnType::SmallInt),
            "INTEGER" => Some(ColumnType::Integer),
            "BIGINT" => Some(ColumnType::BigInt),
            "FLOAT" => Some(ColumnType::Float),
            "DOUBLE" => Some(ColumnType::Double),
            "VARCHAR" => Some(ColumnType::Varchar),
            "TIMESTAMP" => Some(ColumnType::Timestamp),
            "UUID" => Some(ColumnType::Uuid),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option toggles on a column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnOption {
    /// The column accepts NULL values.
    Nullable,
    /// The column rejects NULL values.
    NotNull,
    /// The column value is generated by the database.
    AutoIncrement,
}

/// A single column definition.
///
/// Options are toggled with [`Column::set`] and [`Column::unset`]; both are
/// idempotent and return the column for chaining:
///
/// ```
/// use revtab_schema::{Column, ColumnOption, ColumnType};
///
/// let mut id = Column::new("REV_ID", ColumnType::BigInt);
/// id.set(ColumnOption::AutoIncrement).set(ColumnOption::NotNull);
/// assert!(id.has(ColumnOption::AutoIncrement));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    ty: ColumnType,
    options: Vec<ColumnOption>,
}

impl Column {
    /// Creates a new column with no options set.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            options: Vec::new(),
        }
    }

    /// Creates a new column with the given options already set.
    pub fn with_options(
        name: impl Into<String>,
        ty: ColumnType,
        options: &[ColumnOption],
    ) -> Self {
        let mut column = Self::new(name, ty);
        for &option in options {
            column.set(option);
        }
        column
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the semantic type of the column.
    #[must_use]
    pub const fn ty(&self) -> ColumnType {
        self.ty
    }

    /// Enables an option. Setting an already-set option is a no-op.
    pub fn set(&mut self, option: ColumnOption) -> &mut Self {
        if !self.options.contains(&option) {
            self.options.push(option);
        }
        self
    }

    /// Disables an option. Unsetting an absent option is a no-op.
    pub fn unset(&mut self, option: ColumnOption) -> &mut Self {
        self.options.retain(|&o| o != option);
        self
    }

    /// Checks whether an option is set.
    #[must_use]
    pub fn has(&self, option: ColumnOption) -> bool {
        self.options.contains(&option)
    }

    /// Returns the options set on this column, in the order they were set.
    #[must_use]
    pub fn options(&self) -> &[ColumnOption] {
        &self.options
    }
}
