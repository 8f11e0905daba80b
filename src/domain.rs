use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::MrfError;

pub const SURFACE_DEPTH_M: f64 = 0.5;

pub const TEMPERATURE_VARIABLE: &str = "thetao";
pub const SALINITY_VARIABLE: &str = "so";

pub const OCCURRENCE_LIMIT_MAX: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarineDataset {
    Historical,
    NearRealTime,
}

impl MarineDataset {
    pub fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn for_date(date: NaiveDate) -> Self {
        if date < Self::cutoff() {
            MarineDataset::Historical
        } else {
            MarineDataset::NearRealTime
        }
    }

    pub fn dataset_id(&self) -> &'static str {
        match self {
            MarineDataset::Historical => "cmems_mod_glo_phy_my_0.083deg_P1D-m",
            MarineDataset::NearRealTime => "cmems_mod_glo_phy_myint_0.083deg_P1D-m",
        }
    }
}

impl fmt::Display for MarineDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dataset_id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointQuery {
    pub longitude: f64,
    pub latitude: f64,
    pub year: i32,
    pub day: u32,
    pub month: u32,
    date: NaiveDate,
}

impl PointQuery {
    pub fn new(
        longitude: f64,
        latitude: f64,
        year: i32,
        day: u32,
        month: u32,
    ) -> Result<Self, MrfError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| MrfError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))?;
        Ok(Self {
            longitude,
            latitude,
            year,
            day,
            month,
            date,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn dataset(&self) -> MarineDataset {
        MarineDataset::for_date(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SpeciesName(String);

impl SpeciesName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeciesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SpeciesName {
    type Err = MrfError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(MrfError::InvalidSpecies(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn latitude_param(&self) -> String {
        format!("{},{}", self.lat_min, self.lat_max)
    }

    pub fn longitude_param(&self) -> String {
        format!("{},{}", self.lon_min, self.lon_max)
    }
}

impl FromStr for BoundingBox {
    type Err = MrfError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .ok_or_else(|| MrfError::InvalidBoundingBox(format!("not a number: {part}")))
            })
            .collect::<Result<Vec<_>, MrfError>>()?;
        let &[lat_min, lat_max, lon_min, lon_max] = parts.as_slice() else {
            return Err(MrfError::InvalidBoundingBox(format!(
                "expected 4 values (lat_min lat_max lon_min lon_max), got {}",
                parts.len()
            )));
        };
        if lat_min > lat_max || lon_min > lon_max {
            return Err(MrfError::InvalidBoundingBox(
                "bounds must be ordered low to high".to_string(),
            ));
        }
        if lat_min < -90.0 || lat_max > 90.0 {
            return Err(MrfError::InvalidBoundingBox(
                "latitude outside [-90, 90]".to_string(),
            ));
        }
        if lon_min < -180.0 || lon_max > 180.0 {
            return Err(MrfError::InvalidBoundingBox(
                "longitude outside [-180, 180]".to_string(),
            ));
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(begin: &str, end: &str) -> Result<Self, MrfError> {
        let begin = parse_iso_date(begin)?;
        let end = parse_iso_date(end)?;
        if begin > end {
            return Err(MrfError::InvalidDateRange(format!(
                "begin {begin} is after end {end}"
            )));
        }
        Ok(Self { begin, end })
    }

    pub fn as_param(&self) -> String {
        format!(
            "{},{}",
            self.begin.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, MrfError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| MrfError::InvalidDate(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceLimit(u32);

impl OccurrenceLimit {
    pub fn new(requested: u32) -> Self {
        Self(requested)
    }

    pub fn requested(&self) -> u32 {
        self.0
    }

    pub fn exceeds_cap(&self) -> bool {
        self.0 > OCCURRENCE_LIMIT_MAX
    }

    pub fn effective(&self) -> u32 {
        self.0.min(OCCURRENCE_LIMIT_MAX)
    }
}

impl Default for OccurrenceLimit {
    fn default() -> Self {
        Self(OCCURRENCE_LIMIT_MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceQuery {
    pub species: SpeciesName,
    pub bbox: BoundingBox,
    pub limit: OccurrenceLimit,
    pub dates: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonFilter {
    Key(u64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceSearch {
    pub taxon: TaxonFilter,
    pub latitude: String,
    pub longitude: String,
    pub event_date: String,
    pub has_coordinate: bool,
    pub limit: u32,
}

impl OccurrenceSearch {
    pub fn from_query(query: &OccurrenceQuery, taxon: TaxonFilter) -> Self {
        Self {
            taxon,
            latitude: query.bbox.latitude_param(),
            longitude: query.bbox.longitude_param(),
            event_date: query.dates.as_param(),
            has_coordinate: true,
            limit: query.limit.effective(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarineRecord {
    pub query: PointQuery,
    pub temperature: f64,
    pub salinity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceRecord {
    pub longitude: String,
    pub latitude: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}
