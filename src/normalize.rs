use std::collections::HashSet;

use crate::cmems::PointSample;
use crate::domain::{MarineRecord, OccurrenceRecord, PointQuery};
use crate::gbif::RawOccurrence;

// Rounds the exact binary value half-to-even: 18.125 -> 18.12.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

pub fn normalize_sample(query: PointQuery, sample: PointSample) -> Option<MarineRecord> {
    let temperature = round2(sample.temperature);
    let salinity = round2(sample.salinity);
    if temperature.is_nan() || salinity.is_nan() {
        return None;
    }
    Some(MarineRecord {
        query,
        temperature,
        salinity,
    })
}

pub fn occurrence_record(raw: &RawOccurrence) -> Option<OccurrenceRecord> {
    let day = raw.day?;
    Some(OccurrenceRecord {
        longitude: format!("{:.4}", raw.decimal_longitude?),
        latitude: format!("{:.4}", raw.decimal_latitude?),
        year: raw.year?,
        month: raw.month?,
        day,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceSummary {
    pub records: Vec<OccurrenceRecord>,
    pub incomplete: usize,
    pub duplicates: usize,
}

pub fn normalize_occurrences(raw: &[RawOccurrence]) -> OccurrenceSummary {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut summary = OccurrenceSummary::default();

    for entry in raw {
        let Some(record) = occurrence_record(entry) else {
            summary.incomplete += 1;
            continue;
        };
        if seen.insert(record.clone()) {
            let longitude = coordinate_key(&record.longitude);
            let latitude = coordinate_key(&record.latitude);
            kept.push((longitude, latitude, record));
        } else {
            summary.duplicates += 1;
        }
    }

    // Same-day records fall back to numeric coordinate order so the output
    // does not depend on the order the service returned them in.
    kept.sort_by(|(a_lon, a_lat, a), (b_lon, b_lat, b)| {
        (a.year, a.month, a.day)
            .cmp(&(b.year, b.month, b.day))
            .then_with(|| a_lon.total_cmp(b_lon))
            .then_with(|| a_lat.total_cmp(b_lat))
    });
    summary.records = kept.into_iter().map(|(_, _, record)| record).collect();
    summary
}

// Sort key taken from the written four-decimal text, not the raw value, so
// duplicates collapsing to the same row always sort the same way.
fn coordinate_key(formatted: &str) -> f64 {
    formatted.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lon: f64, lat: f64, year: i32, month: u32, day: Option<u32>) -> RawOccurrence {
        RawOccurrence {
            decimal_longitude: Some(lon),
            decimal_latitude: Some(lat),
            year: Some(year),
            month: Some(month),
            day,
            ..RawOccurrence::default()
        }
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(18.234), 18.23);
        assert_eq!(round2(36.111), 36.11);
        assert_eq!(round2(-1.005_1), -1.01);
    }

    #[test]
    fn exact_ties_round_half_to_even() {
        assert_eq!(round2(18.125), 18.12);
        assert_eq!(round2(-1.625), -1.62);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(36.375), 36.38);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn nan_sample_is_dropped() {
        let query = PointQuery::new(-47.9, -15.8, 2020, 1, 1).unwrap();
        let sample = PointSample {
            temperature: 21.0,
            salinity: f64::NAN,
        };
        assert!(normalize_sample(query, sample).is_none());
    }

    #[test]
    fn coordinates_keep_trailing_zeros() {
        let record = occurrence_record(&raw(-40.5, -20.0, 2019, 5, Some(10))).unwrap();
        assert_eq!(record.longitude, "-40.5000");
        assert_eq!(record.latitude, "-20.0000");
    }

    #[test]
    fn duplicates_compare_formatted_coordinates() {
        let summary = normalize_occurrences(&[
            raw(-40.123_41, -20.0, 2019, 5, Some(10)),
            raw(-40.123_44, -20.0, 2019, 5, Some(10)),
            raw(-40.123_44, -20.0, 2019, 5, Some(11)),
        ]);
        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.duplicates, 1);
    }

    #[test]
    fn sorts_by_year_month_day() {
        let summary = normalize_occurrences(&[
            raw(1.0, 1.0, 2019, 1, Some(20)),
            raw(2.0, 2.0, 2018, 12, Some(1)),
            raw(3.0, 3.0, 2019, 1, Some(2)),
        ]);
        let dates = summary
            .records
            .iter()
            .map(|record| (record.year, record.month, record.day))
            .collect::<Vec<_>>();
        assert_eq!(dates, vec![(2018, 12, 1), (2019, 1, 2), (2019, 1, 20)]);
    }

    #[test]
    fn same_day_records_order_by_numeric_longitude() {
        let summary = normalize_occurrences(&[
            raw(-4.0, 1.0, 2019, 5, Some(10)),
            raw(-35.1, 1.0, 2019, 5, Some(10)),
            raw(12.5, 1.0, 2019, 5, Some(10)),
        ]);
        let longitudes = summary
            .records
            .iter()
            .map(|record| record.longitude.as_str())
            .collect::<Vec<_>>();
        assert_eq!(longitudes, vec!["-35.1000", "-4.0000", "12.5000"]);
    }
}
