//! Nationality estimates from `api.nationalize.io`.
//!
//! The service answers with a list of candidate countries ranked by
//! probability. Only the first entry is used; ties are left to the
//! service's own ordering.

use enricher_core::enrich::Attribute;
use enricher_core::error::ResolverError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CountryCandidate {
    pub country_id: String,
    #[serde(default)]
    pub probability: f64,
}

/// `GET /?name=` response.
#[derive(Debug, Deserialize)]
pub struct NationalizeResponse {
    pub name: String,
    #[serde(default)]
    pub country: Vec<CountryCandidate>,
}

impl NationalizeResponse {
    pub fn into_nationality(self) -> Result<String, ResolverError> {
        match self.country.into_iter().next() {
            Some(top) if !top.country_id.is_empty() => Ok(top.country_id),
            _ => Err(ResolverError::undetermined(Attribute::Nationality)),
        }
    }
}
