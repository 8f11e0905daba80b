use std::fs;
use std::io::Read;

use camino::Utf8Path;

use crate::domain::{MarineRecord, OccurrenceRecord, PointQuery};
use crate::error::MrfError;

pub const POINT_COLUMNS: [&str; 5] = ["decimalLongitude", "decimalLatitude", "year", "day", "month"];
pub const MARINE_COLUMNS: [&str; 7] = [
    "decimalLongitude",
    "decimalLatitude",
    "year",
    "day",
    "month",
    "temperature",
    "salinity",
];
pub const OCCURRENCE_COLUMNS: [&str; 5] = POINT_COLUMNS;

pub fn read_points(path: &Utf8Path) -> Result<Vec<PointQuery>, MrfError> {
    let file = fs::File::open(path.as_std_path()).map_err(|err| MrfError::TableRead {
        path: path.to_string(),
        message: err.to_string(),
    })?;
    read_points_from(file).map_err(|err| match err {
        MrfError::TableRead { message, .. } => MrfError::TableRead {
            path: path.to_string(),
            message,
        },
        other => other,
    })
}

pub fn read_points_from<R: Read>(reader: R) -> Result<Vec<PointQuery>, MrfError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let row = index + 1;
        let record = result.map_err(|err| MrfError::TableRead {
            path: "<input>".to_string(),
            message: err.to_string(),
        })?;
        if record.len() != POINT_COLUMNS.len() {
            return Err(MrfError::MalformedRow {
                row,
                message: format!(
                    "expected {} fields, found {}",
                    POINT_COLUMNS.len(),
                    record.len()
                ),
            });
        }
        let longitude: f64 = parse_field(&record, 0, row)?;
        let latitude: f64 = parse_field(&record, 1, row)?;
        let year: i32 = parse_field(&record, 2, row)?;
        let day: u32 = parse_field(&record, 3, row)?;
        let month: u32 = parse_field(&record, 4, row)?;
        let point = PointQuery::new(longitude, latitude, year, day, month).map_err(|err| {
            MrfError::MalformedRow {
                row,
                message: err.to_string(),
            }
        })?;
        points.push(point);
    }
    Ok(points)
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    row: usize,
) -> Result<T, MrfError> {
    let value = record.get(index).unwrap_or_default();
    value.parse().map_err(|_| MrfError::MalformedRow {
        row,
        message: format!("{} is not valid: {value:?}", POINT_COLUMNS[index]),
    })
}

pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

pub fn marine_row(record: &MarineRecord) -> Vec<String> {
    let query = &record.query;
    vec![
        format_float(query.longitude),
        format_float(query.latitude),
        query.year.to_string(),
        query.day.to_string(),
        query.month.to_string(),
        format_float(record.temperature),
        format_float(record.salinity),
    ]
}

pub fn occurrence_row(record: &OccurrenceRecord) -> Vec<String> {
    vec![
        record.longitude.clone(),
        record.latitude.clone(),
        record.year.to_string(),
        record.day.to_string(),
        record.month.to_string(),
    ]
}

pub fn write_marine(path: &Utf8Path, records: &[MarineRecord]) -> Result<(), MrfError> {
    write_table(path, &MARINE_COLUMNS, records.iter().map(marine_row))
}

pub fn write_occurrences(path: &Utf8Path, records: &[OccurrenceRecord]) -> Result<(), MrfError> {
    write_table(path, &OCCURRENCE_COLUMNS, records.iter().map(occurrence_row))
}

pub fn write_table<I>(path: &Utf8Path, header: &[&str], rows: I) -> Result<(), MrfError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let write_err = |message: String| MrfError::TableWrite {
        path: path.to_string(),
        message,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path()).map_err(|err| write_err(err.to_string()))?;
    let existing = fs::metadata(path.as_std_path())
        .ok()
        .map(|meta| meta.permissions());
    let mut builder = tempfile::Builder::new();
    builder.prefix("mrf-table");
    // A fresh table gets the same umask-filtered mode as a plain create.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder
        .tempfile_in(parent.as_std_path())
        .map_err(|err| write_err(err.to_string()))?;
    if let Some(permissions) = existing {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|err| write_err(err.to_string()))?;
    }

    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        writer
            .write_record(header)
            .map_err(|err| write_err(err.to_string()))?;
        for row in rows {
            writer
                .write_record(&row)
                .map_err(|err| write_err(err.to_string()))?;
        }
        writer.flush().map_err(|err| write_err(err.to_string()))?;
    }

    temp.persist(path.as_std_path())
        .map_err(|err| write_err(err.to_string()))?;
    Ok(())
}
