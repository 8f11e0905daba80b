use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::{CmemsSettings, Credentials};
use crate::domain::{
    MarineDataset, PointQuery, SALINITY_VARIABLE, SURFACE_DEPTH_M, TEMPERATURE_VARIABLE,
};
use crate::error::MrfError;

#[derive(Debug, Clone, PartialEq)]
pub struct PointRequest {
    pub dataset: MarineDataset,
    pub variables: [&'static str; 2],
    pub longitude: f64,
    pub latitude: f64,
    pub date: NaiveDate,
    pub depth: f64,
}

impl PointRequest {
    pub fn for_query(query: &PointQuery) -> Self {
        Self {
            dataset: query.dataset(),
            variables: [TEMPERATURE_VARIABLE, SALINITY_VARIABLE],
            longitude: query.longitude,
            latitude: query.latitude,
            date: query.date(),
            depth: SURFACE_DEPTH_M,
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let date = self.date.format("%Y-%m-%d").to_string();
        vec![
            ("dataset_id", self.dataset.dataset_id().to_string()),
            ("variables", self.variables.join(",")),
            ("minimum_longitude", self.longitude.to_string()),
            ("maximum_longitude", self.longitude.to_string()),
            ("minimum_latitude", self.latitude.to_string()),
            ("maximum_latitude", self.latitude.to_string()),
            ("start_datetime", date.clone()),
            ("end_datetime", date),
            ("minimum_depth", self.depth.to_string()),
            ("maximum_depth", self.depth.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSample {
    pub temperature: f64,
    pub salinity: f64,
}

pub trait MarineClient: Send + Sync {
    fn sample(&self, request: &PointRequest) -> Result<PointSample, MrfError>;
}

#[derive(Debug, Clone)]
pub struct CmemsSession {
    base_url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl CmemsSession {
    pub fn login(settings: &CmemsSettings) -> Result<Self, MrfError> {
        let base_url = settings
            .base_url
            .clone()
            .ok_or(MrfError::MissingCmemsEndpoint)?;
        let credentials = settings
            .credentials
            .clone()
            .ok_or(MrfError::MissingCredentials)?;
        Ok(Self {
            base_url,
            credentials,
            timeout: settings.timeout,
        })
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }
}

#[derive(Clone)]
pub struct CmemsHttpClient {
    client: Client,
    session: CmemsSession,
}

impl CmemsHttpClient {
    pub fn new(session: CmemsSession) -> Result<Self, MrfError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("mrf/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MrfError::CmemsHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(session.timeout)
            .build()
            .map_err(|err| MrfError::CmemsHttp(err.to_string()))?;
        Ok(Self { client, session })
    }

    fn point_url(&self) -> String {
        format!("{}/point", self.session.base_url)
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
            .unwrap_or_else(|_| "CMEMS request failed".to_string());
        Err(MrfError::CmemsStatus { status, message })
    }
}

impl MarineClient for CmemsHttpClient {
    fn sample(&self, request: &PointRequest) -> Result<PointSample, MrfError> {
        let response = self
            .client
            .get(self.point_url())
            .basic_auth(
                &self.session.credentials.username,
                Some(&self.session.credentials.password),
            )
            .query(&request.query_params())
            .send()
            .map_err(|err| MrfError::CmemsHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let raw: Value = response
            .json()
            .map_err(|err| MrfError::CmemsHttp(err.to_string()))?;
        parse_point_sample(&raw)
    }
}

pub fn parse_point_sample(raw: &Value) -> Result<PointSample, MrfError> {
    Ok(PointSample {
        temperature: read_variable(raw, TEMPERATURE_VARIABLE)?,
        salinity: read_variable(raw, SALINITY_VARIABLE)?,
    })
}

fn read_variable(raw: &Value, name: &str) -> Result<f64, MrfError> {
    match raw.get(name) {
        Some(Value::Null) => Ok(f64::NAN),
        Some(value) => value.as_f64().ok_or_else(|| {
            MrfError::CmemsHttp(format!("variable {name} is not a number: {value}"))
        }),
        None => Err(MrfError::CmemsHttp(format!(
            "response is missing variable {name}"
        ))),
    }
}
