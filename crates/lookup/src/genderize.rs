//! Gender estimates from `api.genderize.io`.

use enricher_core::enrich::Attribute;
use enricher_core::error::ResolverError;
use serde::Deserialize;

/// `GET /?name=` response. `gender` is `null` when the name is unknown.
#[derive(Debug, Deserialize)]
pub struct GenderizeResponse {
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
}

impl GenderizeResponse {
    pub fn into_gender(self) -> Result<String, ResolverError> {
        match self.gender {
            Some(gender) if !gender.is_empty() => Ok(gender),
            _ => Err(ResolverError::undetermined(Attribute::Gender)),
        }
    }
}
