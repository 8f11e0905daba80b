use std::fs;

use marine_records_fetcher::domain::{OccurrenceSearch, TaxonFilter};
use marine_records_fetcher::gbif::{SearchPage, SpeciesMatch, search_params};
use marine_records_fetcher::normalize::normalize_occurrences;

#[test]
fn parse_search_fixture() {
    let raw = fs::read_to_string("tests/fixtures/gbif_occurrence_search.json").unwrap();
    let page: SearchPage = serde_json::from_str(&raw).unwrap();

    assert_eq!(page.results.len(), 4);
    assert_eq!(page.count, Some(4));
    assert_eq!(page.end_of_records, Some(true));

    let summary = normalize_occurrences(&page.results);
    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.incomplete, 2);
    assert_eq!(summary.records[0].longitude, "-36.0000");
    assert_eq!(summary.records[0].latitude, "-13.0000");
}

#[test]
fn unmatched_name_has_no_usage_key() {
    let matched: SpeciesMatch =
        serde_json::from_str(r#"{"confidence": 100, "matchType": "NONE", "synonym": false}"#)
            .unwrap();
    assert_eq!(matched.usage_key, None);
    assert_eq!(matched.match_type.as_deref(), Some("NONE"));
}

#[test]
fn name_filter_sends_scientific_name() {
    let search = OccurrenceSearch {
        taxon: TaxonFilter::Name("Chelonia mydas".to_string()),
        latitude: "-30,-10".to_string(),
        longitude: "-40,-20".to_string(),
        event_date: "2018-01-01,2019-12-31".to_string(),
        has_coordinate: true,
        limit: 300,
    };
    let params = search_params(&search);
    assert_eq!(
        params[0],
        ("scientificName", "Chelonia mydas".to_string())
    );
    assert!(params.iter().all(|(name, _)| *name != "taxonKey"));
    assert!(params.contains(&("limit", "300".to_string())));
    assert!(params.contains(&("eventDate", "2018-01-01,2019-12-31".to_string())));
}
