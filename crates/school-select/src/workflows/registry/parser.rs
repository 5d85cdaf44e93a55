use super::domain::{Region, SchoolCategory, SchoolRecord};
use super::normalizer::{clean_cell, normalize_header};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

#[derive(Debug)]
pub(crate) enum RegisterEntry {
    Complete(SchoolRecord),
    /// Row lacking a school code or name; `line` is 1-based in the source.
    Incomplete { line: u64 },
}

/// Entries of one sheet plus the number of rows whose invalid UTF-8 bytes
/// were replaced during decoding.
#[derive(Debug, Default)]
pub(crate) struct RegisterSheet {
    pub(crate) entries: Vec<RegisterEntry>,
    pub(crate) repaired: usize,
}

pub(crate) fn parse_entries<R: Read>(reader: R) -> Result<RegisterSheet, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .byte_headers()?
        .iter()
        .map(|header| normalize_header(&String::from_utf8_lossy(header)))
        .collect();

    let mut sheet = RegisterSheet::default();
    for result in csv_reader.byte_records() {
        let raw = result?;
        let line = raw.position().map(|pos| pos.line()).unwrap_or_default();
        let decoded = match csv::StringRecord::from_byte_record(raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(line, "register row is not valid UTF-8, invalid bytes replaced");
                sheet.repaired += 1;
                csv::StringRecord::from_byte_record_lossy(err.into_byte_record())
            }
        };
        let row: RegisterRow = decoded.deserialize(Some(&headers))?;

        sheet.entries.push(match row.into_record() {
            Some(record) => RegisterEntry::Complete(record),
            None => RegisterEntry::Incomplete { line },
        });
    }

    Ok(sheet)
}

#[derive(Debug, Deserialize)]
struct RegisterRow {
    #[serde(rename = "SCHOOL CODE", default, deserialize_with = "empty_string_as_none")]
    code: Option<String>,
    #[serde(rename = "SCHOOL NAME", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "REGION", default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(rename = "GENDER", default, deserialize_with = "empty_string_as_none")]
    gender: Option<String>,
    #[serde(rename = "CATEGORY", default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(rename = "CUTOFF", default, deserialize_with = "empty_string_as_none")]
    cutoff: Option<String>,
    #[serde(rename = "SCHOOL TYPE", default, deserialize_with = "empty_string_as_none")]
    school_type: Option<String>,
    #[serde(
        rename = "PROGRAMMES OFFERED",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    programmes_offered: Option<String>,
    #[serde(rename = "REMARKS", default, deserialize_with = "empty_string_as_none")]
    remarks: Option<String>,
    #[serde(rename = "BOARDING", default, deserialize_with = "empty_string_as_none")]
    boarding: Option<String>,
}

impl RegisterRow {
    fn into_record(self) -> Option<SchoolRecord> {
        let code = self.code?;
        let name = clean_cell(&self.name?);

        Some(SchoolRecord {
            code,
            name,
            region: Region::new(self.region.as_deref().unwrap_or_default()),
            gender_admitted: self.gender.unwrap_or_default(),
            category: SchoolCategory::parse(self.category.as_deref().unwrap_or_default()),
            cutoff: self.cutoff,
            school_type: self.school_type.unwrap_or_default(),
            programmes_offered: self.programmes_offered.unwrap_or_default(),
            remarks: self.remarks.unwrap_or_default(),
            boarding: self.boarding,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
