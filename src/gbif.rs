use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::config::GbifSettings;
use crate::domain::{OccurrenceSearch, SpeciesName, TaxonFilter};
use crate::error::MrfError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOccurrence {
    pub key: Option<u64>,
    pub decimal_longitude: Option<f64>,
    pub decimal_latitude: Option<f64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub event_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<RawOccurrence>,
    pub count: Option<u64>,
    pub end_of_records: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesMatch {
    pub usage_key: Option<u64>,
    pub match_type: Option<String>,
    pub scientific_name: Option<String>,
}

pub trait OccurrenceClient: Send + Sync {
    fn match_species(&self, name: &SpeciesName) -> Result<Option<u64>, MrfError>;
    fn search(&self, search: &OccurrenceSearch) -> Result<Vec<RawOccurrence>, MrfError>;
}

#[derive(Clone)]
pub struct GbifHttpClient {
    client: Client,
    base_url: String,
}

impl GbifHttpClient {
    pub fn new(settings: &GbifSettings) -> Result<Self, MrfError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("mrf/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MrfError::GbifHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| MrfError::GbifHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, MrfError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "GBIF request failed".to_string());
        Err(MrfError::GbifStatus { status, message })
    }
}

impl OccurrenceClient for GbifHttpClient {
    fn match_species(&self, name: &SpeciesName) -> Result<Option<u64>, MrfError> {
        let url = format!("{}/species/match", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&[("name", name.as_str()), ("rank", "SPECIES")])
            .send()
            .map_err(|err| MrfError::GbifHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let matched: SpeciesMatch = response
            .json()
            .map_err(|err| MrfError::GbifHttp(err.to_string()))?;
        Ok(matched.usage_key)
    }

    fn search(&self, search: &OccurrenceSearch) -> Result<Vec<RawOccurrence>, MrfError> {
        let url = format!("{}/occurrence/search", self.base_url);
        let response = self
            .client
            .get(url)
            .query(&search_params(search))
            .send()
            .map_err(|err| MrfError::GbifHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let page: SearchPage = response
            .json()
            .map_err(|err| MrfError::GbifHttp(err.to_string()))?;
        tracing::debug!(
            returned = page.results.len(),
            total = page.count.unwrap_or_default(),
            end_of_records = page.end_of_records.unwrap_or(true),
            "gbif search page"
        );
        Ok(page.results)
    }
}

pub fn search_params(search: &OccurrenceSearch) -> Vec<(&'static str, String)> {
    let taxon = match &search.taxon {
        TaxonFilter::Key(key) => ("taxonKey", key.to_string()),
        TaxonFilter::Name(name) => ("scientificName", name.clone()),
    };
    vec![
        taxon,
        ("decimalLatitude", search.latitude.clone()),
        ("decimalLongitude", search.longitude.clone()),
        ("eventDate", search.event_date.clone()),
        ("hasCoordinate", search.has_coordinate.to_string()),
        ("limit", search.limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_filter_omits_scientific_name() {
        let search = OccurrenceSearch {
            taxon: TaxonFilter::Key(2_417_525),
            latitude: "-30,-10".to_string(),
            longitude: "-40,-20".to_string(),
            event_date: "2018-01-01,2019-12-31".to_string(),
            has_coordinate: true,
            limit: 300,
        };
        let params = search_params(&search);
        assert_eq!(params[0], ("taxonKey", "2417525".to_string()));
        assert!(params.iter().all(|(name, _)| *name != "scientificName"));
        assert!(params.contains(&("hasCoordinate", "true".to_string())));
    }

    #[test]
    fn deserialize_partial_occurrence() {
        let raw: RawOccurrence =
            serde_json::from_str(r#"{"key": 1, "year": 2019, "month": 5}"#).unwrap();
        assert_eq!(raw.year, Some(2019));
        assert_eq!(raw.day, None);
        assert_eq!(raw.decimal_latitude, None);
    }
}
