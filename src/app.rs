use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;

use crate::cmems::{MarineClient, PointRequest};
use crate::domain::{
    MarineDataset, MarineRecord, OccurrenceQuery, OccurrenceSearch, PointQuery, TaxonFilter,
};
use crate::error::MrfError;
use crate::gbif::OccurrenceClient;
use crate::normalize::{OccurrenceSummary, normalize_occurrences, normalize_sample};
use crate::table;

#[derive(Debug, Clone, Serialize)]
pub struct MarineResult {
    pub input: String,
    pub output: String,
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
    pub historical_queries: usize,
    pub near_real_time_queries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceResult {
    pub species: String,
    pub taxon: TaxonFilter,
    pub output: Option<String>,
    pub limit_requested: u32,
    pub limit_sent: u32,
    pub raw_records: usize,
    pub incomplete_dates: usize,
    pub duplicates: usize,
    pub rows_written: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Default)]
pub struct MarineBatch {
    pub records: Vec<MarineRecord>,
    pub skipped: usize,
    pub historical: usize,
    pub near_real_time: usize,
}

#[derive(Debug, Clone)]
pub struct OccurrenceBatch {
    pub taxon: TaxonFilter,
    pub raw_records: usize,
    pub summary: OccurrenceSummary,
}

#[derive(Clone)]
pub struct App<M: MarineClient, O: OccurrenceClient> {
    marine: M,
    occurrences: O,
}

impl<M: MarineClient, O: OccurrenceClient> App<M, O> {
    pub fn new(marine: M, occurrences: O) -> Self {
        Self {
            marine,
            occurrences,
        }
    }

    pub fn run_marine(
        &self,
        input: &Utf8Path,
        output: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<MarineResult, MrfError> {
        sink.event(ProgressEvent {
            message: format!("phase=Read; {input}"),
            elapsed: None,
        });
        let points = table::read_points(input)?;
        let rows_read = points.len();

        let batch = self.fetch_marine(points, sink)?;

        sink.event(ProgressEvent {
            message: format!("phase=Write; {} rows to {output}", batch.records.len()),
            elapsed: None,
        });
        table::write_marine(output, &batch.records)?;

        Ok(MarineResult {
            input: input.to_string(),
            output: output.to_string(),
            rows_read,
            rows_written: batch.records.len(),
            rows_skipped: batch.skipped,
            historical_queries: batch.historical,
            near_real_time_queries: batch.near_real_time,
        })
    }

    pub fn fetch_marine(
        &self,
        points: Vec<PointQuery>,
        sink: &dyn ProgressSink,
    ) -> Result<MarineBatch, MrfError> {
        let total = points.len();
        let mut batch = MarineBatch::default();

        for (index, point) in points.into_iter().enumerate() {
            let request = PointRequest::for_query(&point);
            match request.dataset {
                MarineDataset::Historical => batch.historical += 1,
                MarineDataset::NearRealTime => batch.near_real_time += 1,
            }

            let start = Instant::now();
            let sample = self.marine.sample(&request)?;
            sink.event(ProgressEvent {
                message: format!(
                    "cmems.response row={}/{total} dataset={} date={}",
                    index + 1,
                    request.dataset,
                    request.date
                ),
                elapsed: Some(start.elapsed()),
            });

            match normalize_sample(point, sample) {
                Some(record) => batch.records.push(record),
                None => {
                    tracing::debug!(row = index + 1, "skipping point without ocean values");
                    batch.skipped += 1;
                }
            }
        }

        Ok(batch)
    }

    pub fn resolve_taxon(
        &self,
        query: &OccurrenceQuery,
        sink: &dyn ProgressSink,
    ) -> Result<TaxonFilter, MrfError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; species {}", query.species),
            elapsed: None,
        });
        let taxon = match self.occurrences.match_species(&query.species)? {
            Some(key) => TaxonFilter::Key(key),
            None => {
                sink.event(ProgressEvent {
                    message: "gbif.match none; searching by scientific name".to_string(),
                    elapsed: None,
                });
                TaxonFilter::Name(query.species.as_str().to_string())
            }
        };
        Ok(taxon)
    }

    pub fn fetch_occurrences(
        &self,
        query: &OccurrenceQuery,
        sink: &dyn ProgressSink,
    ) -> Result<OccurrenceBatch, MrfError> {
        if query.limit.exceeds_cap() {
            tracing::warn!(
                requested = query.limit.requested(),
                sent = query.limit.effective(),
                "occurrence limit exceeds the service maximum; request clamped"
            );
        }

        let taxon = self.resolve_taxon(query, sink)?;
        let search = OccurrenceSearch::from_query(query, taxon.clone());

        sink.event(ProgressEvent {
            message: "gbif.request".to_string(),
            elapsed: None,
        });
        let start = Instant::now();
        let raw = self.occurrences.search(&search)?;
        sink.event(ProgressEvent {
            message: format!("gbif.response results={}", raw.len()),
            elapsed: Some(start.elapsed()),
        });

        Ok(OccurrenceBatch {
            taxon,
            raw_records: raw.len(),
            summary: normalize_occurrences(&raw),
        })
    }

    pub fn run_occurrences(
        &self,
        query: &OccurrenceQuery,
        output: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<OccurrenceResult, MrfError> {
        let OccurrenceBatch {
            taxon,
            raw_records,
            summary,
        } = self.fetch_occurrences(query, sink)?;

        let written = if summary.records.is_empty() {
            None
        } else {
            sink.event(ProgressEvent {
                message: format!("phase=Write; {} rows to {output}", summary.records.len()),
                elapsed: None,
            });
            table::write_occurrences(output, &summary.records)?;
            Some(output.to_string())
        };

        Ok(OccurrenceResult {
            species: query.species.to_string(),
            taxon,
            output: written,
            limit_requested: query.limit.requested(),
            limit_sent: query.limit.effective(),
            raw_records,
            incomplete_dates: summary.incomplete,
            duplicates: summary.duplicates,
            rows_written: summary.records.len(),
        })
    }
}
