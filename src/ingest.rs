//! Reading ping rows out of uploaded CSV files.

use std::{fs::File, io, path::Path};

use anyhow::{Context, Result};
use csv::ByteRecord;
use log::{debug, warn};

use crate::config::Columns;

/// One data row of the source file. Fields are `None` when the column is
/// missing from the header or the row is too short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPing {
    pub vehicle_id: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub timestamp: Option<String>,
}

struct ColumnIndex {
    vehicle: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    timestamp: Option<usize>,
}

impl ColumnIndex {
    fn new(headers: &ByteRecord, columns: &Columns) -> Self {
        let find = |name: &str| {
            let index = headers.iter().position(|x| x == name.as_bytes());
            if index.is_none() {
                warn!("column {name:?} not found in header, its values will be treated as missing");
            }
            index
        };

        Self {
            vehicle: find(&columns.vehicle),
            latitude: find(&columns.latitude),
            longitude: find(&columns.longitude),
            timestamp: find(&columns.timestamp),
        }
    }

    /// Only the looked-up fields are decoded, lossily, so stray bytes in
    /// other columns cannot fail a row.
    fn ping(&self, record: &ByteRecord) -> RawPing {
        let field = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(|x| String::from_utf8_lossy(x).into_owned())
        };
        RawPing {
            vehicle_id: field(self.vehicle),
            latitude: field(self.latitude),
            longitude: field(self.longitude),
            timestamp: field(self.timestamp),
        }
    }
}

/// Parse a header-led CSV into rows.
///
/// Returns `None` when there is no data row at all (empty input or a lone
/// header), in which case callers keep whatever they had before.
pub fn read<R: io::Read>(reader: R, columns: &Columns) -> Result<Option<Vec<RawPing>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .byte_headers()
        .context("Failed to read CSV header")?
        .clone();
    if headers.is_empty() {
        return Ok(None);
    }
    let index = ColumnIndex::new(&headers, columns);

    let mut output = Vec::new();
    let mut record = ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Failed to read CSV row {}", output.len() + 1))?
    {
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        output.push(index.ping(&record));
    }

    debug!("read {} rows", output.len());
    if output.is_empty() {
        return Ok(None);
    }
    Ok(Some(output))
}

pub fn read_path(path: &Path, columns: &Columns) -> Result<Option<Vec<RawPing>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read(file, columns)
}
