use std::io::{self, Write};

use serde::Serialize;

use crate::app::{MarineResult, OccurrenceResult, ProgressEvent, ProgressSink};

pub const NO_OCCURRENCES_MESSAGE: &str = "No occurrence records found for the given parameters.";

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Plain,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_marine(result: &MarineResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_occurrences(result: &OccurrenceResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct PlainOutput;

impl PlainOutput {
    pub fn print_marine(result: &MarineResult) {
        println!("Records written to {}", result.output);
    }

    pub fn print_occurrences(result: &OccurrenceResult) {
        match &result.output {
            Some(path) => println!("Records written to {path}"),
            None => println!("{NO_OCCURRENCES_MESSAGE}"),
        }
    }
}

pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::info!(
                latency_ms = elapsed.as_millis() as u64,
                "{}",
                event.message
            ),
            None => tracing::info!("{}", event.message),
        }
    }
}
