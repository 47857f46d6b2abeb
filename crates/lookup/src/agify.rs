//! Age estimates from `api.agify.io`.

use enricher_core::enrich::Attribute;
use enricher_core::error::ResolverError;
use serde::Deserialize;

/// `GET /?name=` response. `age` is `null` when the name is unknown.
#[derive(Debug, Deserialize)]
pub struct AgifyResponse {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
}

impl AgifyResponse {
    pub fn into_age(self) -> Result<u32, ResolverError> {
        match self.age {
            Some(age) if age > 0 => Ok(age),
            _ => Err(ResolverError::undetermined(Attribute::Age)),
        }
    }
}
