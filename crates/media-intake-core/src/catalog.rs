//! Product catalog lookup.
//!
//! The catalog resolves barcodes into the product identity, display name and
//! article. One request carries the whole batch of barcodes.

use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::CatalogConfig;
use crate::error::Result;

/// One catalog entry, keyed by barcode
///
/// The vendor's field names are mapped here and nowhere else. Unknown barcodes
/// come back with an empty name, which deserializes to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "ШК")]
    pub barcode: String,

    #[serde(rename = "Наименование", default, deserialize_with = "non_empty")]
    pub display_name: Option<String>,

    #[serde(rename = "Трим_Аим", default, deserialize_with = "non_empty")]
    pub canonical_identity: Option<String>,

    #[serde(rename = "Металл", default, deserialize_with = "non_empty")]
    pub material: Option<String>,

    #[serde(rename = "Диагностика", default, deserialize_with = "non_empty")]
    pub diagnostic_reason: Option<String>,

    #[serde(rename = "Артикул", default, deserialize_with = "non_empty")]
    pub article: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Anything that can resolve a batch of barcodes
pub trait CatalogLookup {
    /// Resolve every barcode in one call
    fn lookup(&self, barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>>;
}

impl<T: CatalogLookup + ?Sized> CatalogLookup for &T {
    fn lookup(&self, barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>> {
        (**self).lookup(barcodes)
    }
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    series: Vec<&'a str>,
}

/// Catalog reached over HTTP with basic auth
pub struct HttpCatalogClient {
    client: reqwest::blocking::Client,
    url: String,
    login: String,
    password: String,
}

impl HttpCatalogClient {
    /// Build a client from the catalog section of the configuration
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        // `None` lifts reqwest's 30s default
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            login: config.login.clone(),
            password: config.password.clone(),
        })
    }
}

impl CatalogLookup for HttpCatalogClient {
    fn lookup(&self, barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>> {
        info!("Resolving {} barcodes against {}", barcodes.len(), self.url);

        let request = LookupRequest {
            series: barcodes.iter().map(String::as_str).collect(),
        };

        let rows: Vec<CatalogRow> = self
            .client
            .post(&self.url)
            .basic_auth(&self.login, Some(&self.password))
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        debug!("Catalog returned {} rows", rows.len());
        Ok(rows)
    }
}
