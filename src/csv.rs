use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::{Derivation, RawAmount, RawAttributes};

/// Errors that can occur when reading or writing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: ::csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: ::csv::Error },

    #[error("failed to write row: {0}")]
    Write(#[from] ::csv::Error),

    #[error("failed to flush output: {0}")]
    Flush(#[from] io::Error),
}

/// One submitted transaction. Amounts stay textual so no precision is lost.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct InputRow {
    rbc: Option<String>,
    ran: Option<String>,
    sbc: Option<String>,
    san: Option<String>,
    ttc: Option<String>,
    tamt: Option<String>,
    #[serde(default)]
    itn: Option<String>,
    ctype: Option<String>,
    #[serde(default)]
    cid: Option<String>,
    cloc: Option<String>,
}

impl From<InputRow> for RawAttributes {
    fn from(row: InputRow) -> Self {
        RawAttributes {
            rbc: row.rbc,
            ran: row.ran,
            sbc: row.sbc,
            san: row.san,
            ttc: row.ttc,
            tamt: row.tamt.map(RawAmount::Text),
            itn: row.itn,
            ctype: row.ctype,
            cid: row.cid,
            cloc: row.cloc,
        }
    }
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    line: usize,
    band: i64,
    key: &'a str,
}

/// A parsed csv record tagged with its 1-indexed line number.
#[derive(Debug, Clone)]
pub struct Record {
    pub line: usize,
    pub attributes: RawAttributes,
}

/// Read transaction attributes from a csv file with a header row
pub fn read_attributes(
    path: &Path,
) -> Result<impl Iterator<Item = Result<Record, CsvError>> + use<>, CsvError> {
    let reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            Ok(Record {
                line,
                attributes: row.into(),
            })
        }))
}

/// Write derived keys in csv format
pub fn write_keys<W: io::Write>(
    writer: W,
    keys: impl IntoIterator<Item = (usize, Derivation)>,
) -> Result<(), CsvError> {
    let mut writer = ::csv::Writer::from_writer(writer);

    for (line, derivation) in keys {
        writer.serialize(OutputRow {
            line,
            band: derivation.band.id(),
            key: derivation.key.as_str(),
        })?;
    }

    writer.flush()?;
    Ok(())
}
