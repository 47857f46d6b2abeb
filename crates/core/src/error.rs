use std::fmt;

use crate::enrich::Attribute;
use crate::types::DbId;

/// Boxed error used to carry transport and driver failures across crate
/// boundaries without leaking `reqwest` or `sqlx` into the core.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single violated rule on a [`Person`](crate::person::Person).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("name can't be empty")]
    EmptyName,

    #[error("surname can't be empty")]
    EmptySurname,
}

impl Violation {
    /// Name of the offending field.
    pub fn field(self) -> &'static str {
        match self {
            Violation::EmptyName => "name",
            Violation::EmptySurname => "surname",
        }
    }
}

/// Every rule a record failed, collected rather than short-circuited.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Failure of one attribute lookup. Exactly one value per failed call.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The request never produced a usable response (network, TLS,
    /// non-success status).
    #[error("{attribute} lookup failed: {source}")]
    Transport {
        attribute: Attribute,
        #[source]
        source: BoxError,
    },

    /// The service answered, but not with the expected JSON shape.
    #[error("{attribute} lookup returned a malformed body: {source}")]
    Decode {
        attribute: Attribute,
        #[source]
        source: BoxError,
    },

    /// The service answered correctly but had no value for this name.
    #[error("couldn't determine {attribute}")]
    Undetermined { attribute: Attribute },
}

impl ResolverError {
    pub fn transport(attribute: Attribute, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            attribute,
            source: source.into(),
        }
    }

    pub fn decode(attribute: Attribute, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            attribute,
            source: source.into(),
        }
    }

    pub fn undetermined(attribute: Attribute) -> Self {
        Self::Undetermined { attribute }
    }

    /// Which lookup produced this error.
    pub fn attribute(&self) -> Attribute {
        match self {
            ResolverError::Transport { attribute, .. }
            | ResolverError::Decode { attribute, .. }
            | ResolverError::Undetermined { attribute } => *attribute,
        }
    }
}

/// Joint failure of a fan-out: one to three [`ResolverError`]s, in
/// age, gender, nationality order.
#[derive(Debug, thiserror::Error)]
#[error("failed to enrich person: {}", join(.failures))]
pub struct EnrichmentError {
    failures: Vec<ResolverError>,
}

impl EnrichmentError {
    pub fn new(failures: Vec<ResolverError>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ResolverError] {
        &self.failures
    }

    /// The failure for `attribute`, if that lookup failed.
    pub fn failure_for(&self, attribute: Attribute) -> Option<&ResolverError> {
        self.failures.iter().find(|f| f.attribute() == attribute)
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// The write operations that must touch exactly one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Update,
    Delete,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOperation::Update => "update",
            WriteOperation::Delete => "delete",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("person with id {id} not found")]
    NotFound { id: DbId },

    /// A single-row write touched zero rows (row vanished) or more than one
    /// (broken key assumption).
    #[error("{operation} of person {id} affected {affected} rows instead of 1")]
    Integrity {
        operation: WriteOperation,
        id: DbId,
        affected: u64,
    },

    #[error("storage error: {0}")]
    Storage(#[source] BoxError),
}

impl RepositoryError {
    pub fn storage(source: impl Into<BoxError>) -> Self {
        Self::Storage(source.into())
    }
}

/// `"a; b; c"` from the `Display` of each item.
fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
