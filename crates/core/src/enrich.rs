//! Enrichment coordinator.
//!
//! A person's age, gender and nationality are estimated from their given
//! name by three independent lookup services. [`resolve_attributes`] issues
//! all three lookups at once, waits for every one of them to finish, and
//! only then decides: all three succeeded, or the whole enrichment failed
//! with every individual failure attached.

use std::fmt;

use async_trait::async_trait;

use crate::error::{EnrichmentError, ResolverError};

/// The derived attributes a lookup can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Age,
    Gender,
    Nationality,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Age => "age",
            Attribute::Gender => "gender",
            Attribute::Nationality => "nationality",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three attribute lookups, one network call each.
///
/// Implementations make a single attempt per call: no retries, no timeout
/// beyond the transport's own.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Estimated age, always greater than zero on success.
    async fn age_by_name(&self, name: &str) -> Result<u32, ResolverError>;

    /// Most likely gender, never empty on success.
    async fn gender_by_name(&self, name: &str) -> Result<String, ResolverError>;

    /// Top-ranked country code, never empty on success.
    async fn nationality_by_name(&self, name: &str) -> Result<String, ResolverError>;
}

/// Successful outcome of a full fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub age: u32,
    pub gender: String,
    pub nationality: String,
}

/// Run the three lookups for `name` concurrently and join on all of them.
///
/// A failing lookup does not cancel the others. Failures are reported in
/// age, gender, nationality order.
pub async fn resolve_attributes<E>(enricher: &E, name: &str) -> Result<Attributes, EnrichmentError>
where
    E: Enricher + ?Sized,
{
    let (age, gender, nationality) = tokio::join!(
        enricher.age_by_name(name),
        enricher.gender_by_name(name),
        enricher.nationality_by_name(name),
    );

    match (age, gender, nationality) {
        (Ok(age), Ok(gender), Ok(nationality)) => Ok(Attributes {
            age,
            gender,
            nationality,
        }),
        (age, gender, nationality) => {
            let failures = [age.err(), gender.err(), nationality.err()]
                .into_iter()
                .flatten()
                .collect();
            Err(EnrichmentError::new(failures))
        }
    }
}
