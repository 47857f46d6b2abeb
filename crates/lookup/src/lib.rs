//! HTTP client for the three demographic lookup services.
//!
//! [`DemographicsClient`] implements [`Enricher`] on top of a single shared
//! [`reqwest::Client`]: one `GET {base}/?name=...` per attribute, one
//! attempt per call, no timeout beyond the client default.

pub mod agify;
pub mod genderize;
pub mod nationalize;

use async_trait::async_trait;
use enricher_core::enrich::{Attribute, Enricher};
use enricher_core::error::ResolverError;
use serde::de::DeserializeOwned;

use crate::agify::AgifyResponse;
use crate::genderize::GenderizeResponse;
use crate::nationalize::NationalizeResponse;

/// Base URLs of the lookup services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub agify_url: String,
    pub genderize_url: String,
    pub nationalize_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            agify_url: "https://api.agify.io".into(),
            genderize_url: "https://api.genderize.io".into(),
            nationalize_url: "https://api.nationalize.io".into(),
        }
    }
}

impl LookupConfig {
    /// Load base URLs from the environment, falling back to the public
    /// services.
    ///
    /// | Env Var           | Default                      |
    /// |-------------------|------------------------------|
    /// | `AGIFY_URL`       | `https://api.agify.io`       |
    /// | `GENDERIZE_URL`   | `https://api.genderize.io`   |
    /// | `NATIONALIZE_URL` | `https://api.nationalize.io` |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            agify_url: std::env::var("AGIFY_URL").unwrap_or(defaults.agify_url),
            genderize_url: std::env::var("GENDERIZE_URL").unwrap_or(defaults.genderize_url),
            nationalize_url: std::env::var("NATIONALIZE_URL").unwrap_or(defaults.nationalize_url),
        }
    }

    fn base_url(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Age => &self.agify_url,
            Attribute::Gender => &self.genderize_url,
            Attribute::Nationality => &self.nationalize_url,
        }
    }
}

/// Lookup client for agify, genderize and nationalize.
#[derive(Debug, Clone)]
pub struct DemographicsClient {
    client: reqwest::Client,
    config: LookupConfig,
}

impl DemographicsClient {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    // ---- private helpers ----

    /// Issue the lookup for `attribute` and decode the body as `T`.
    ///
    /// Network errors and non-2xx statuses are `Transport` failures; a body
    /// that is not the expected JSON is a `Decode` failure.
    async fn fetch<T: DeserializeOwned>(
        &self,
        attribute: Attribute,
        name: &str,
    ) -> Result<T, ResolverError> {
        let response = self
            .client
            .get(self.config.base_url(attribute))
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| ResolverError::transport(attribute, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ResolverError::transport(
                attribute,
                format!("upstream returned {status}: {body}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolverError::transport(attribute, e))?;

        serde_json::from_slice(&bytes).map_err(|e| ResolverError::decode(attribute, e))
    }
}

/// Log the outcome of one lookup and pass it through unchanged.
fn traced<T: std::fmt::Debug>(
    attribute: Attribute,
    name: &str,
    result: Result<T, ResolverError>,
) -> Result<T, ResolverError> {
    match &result {
        Ok(value) => tracing::debug!(%attribute, name, ?value, "Lookup succeeded"),
        Err(err) => tracing::warn!(%attribute, name, error = %err, "Lookup failed"),
    }
    result
}

#[async_trait]
impl Enricher for DemographicsClient {
    async fn age_by_name(&self, name: &str) -> Result<u32, ResolverError> {
        let result = self
            .fetch::<AgifyResponse>(Attribute::Age, name)
            .await
            .and_then(AgifyResponse::into_age);
        traced(Attribute::Age, name, result)
    }

    async fn gender_by_name(&self, name: &str) -> Result<String, ResolverError> {
        let result = self
            .fetch::<GenderizeResponse>(Attribute::Gender, name)
            .await
            .and_then(GenderizeResponse::into_gender);
        traced(Attribute::Gender, name, result)
    }

    async fn nationality_by_name(&self, name: &str) -> Result<String, ResolverError> {
        let result = self
            .fetch::<NationalizeResponse>(Attribute::Nationality, name)
            .await
            .and_then(NationalizeResponse::into_nationality);
        traced(Attribute::Nationality, name, result)
    }
}
