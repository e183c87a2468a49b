use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::de;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::super::assessment::domain::CommissioningPool;
use super::{Coverage, LaInCatchment};

#[derive(Debug, Error)]
pub enum CatchmentImportError {
    #[error("failed to read catchment export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catchment CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row} ({la_name}): pool must be between 1 and 4, got {value}")]
    InvalidPool {
        row: usize,
        la_name: String,
        value: u8,
    },
}

/// Local authorities overlapping a catchment, as exported from SEND insights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catchment {
    pub local_authorities: Vec<LaInCatchment>,
}

impl Catchment {
    pub fn total_unplaced(&self) -> u32 {
        self.local_authorities.iter().map(|la| la.unplaced).sum()
    }
}

pub struct CatchmentImporter;

impl CatchmentImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Catchment, CatchmentImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Expects a header row `la_name,pool,coverage,coverage_percent,students,ehcps,unplaced`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Catchment, CatchmentImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut local_authorities = Vec::new();

        for (index, record) in csv_reader.deserialize::<CatchmentRow>().enumerate() {
            let row = record?;
            let pool = CommissioningPool::new(row.pool).ok_or_else(|| {
                CatchmentImportError::InvalidPool {
                    row: index + 1,
                    la_name: row.la_name.clone(),
                    value: row.pool,
                }
            })?;

            local_authorities.push(LaInCatchment {
                la_name: row.la_name,
                pool,
                coverage: row.coverage,
                coverage_percent: row.coverage_percent,
                students: row.students,
                ehcps: row.ehcps,
                unplaced: row.unplaced,
            });
        }

        Ok(Catchment { local_authorities })
    }
}

#[derive(Debug, Deserialize)]
struct CatchmentRow {
    la_name: String,
    pool: u8,
    #[serde(default, deserialize_with = "coverage_or_full")]
    coverage: Coverage,
    #[serde(default, deserialize_with = "blank_as_default")]
    coverage_percent: f64,
    #[serde(default, deserialize_with = "blank_as_default")]
    students: u32,
    #[serde(default, deserialize_with = "blank_as_default")]
    ehcps: u32,
    #[serde(default, deserialize_with = "blank_as_default")]
    unplaced: u32,
}

fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value.parse().map_err(de::Error::custom),
    }
}

fn coverage_or_full<'de, D>(deserializer: D) -> Result<Coverage, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("partial") => Coverage::Partial,
        _ => Coverage::Full,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
la_name,pool,coverage,coverage_percent,students,ehcps,unplaced
Kent,2,full,100,1200,880,140
Medway,3,Partial,45.5,410,300,60
Bexley,1,,,,,
";

    #[test]
    fn imports_rows_and_sums_unplaced() {
        let catchment = CatchmentImporter::from_reader(EXPORT.as_bytes()).expect("valid export");
        assert_eq!(catchment.local_authorities.len(), 3);
        assert_eq!(catchment.total_unplaced(), 200);

        let medway = &catchment.local_authorities[1];
        assert_eq!(medway.coverage, Coverage::Partial);
        assert_eq!(medway.coverage_percent, 45.5);
        assert_eq!(medway.pool.get(), 3);
        assert_eq!(catchment.local_authorities[2].coverage, Coverage::Full);
    }

    #[test]
    fn rejects_out_of_range_pool() {
        let export = "la_name,pool,coverage,coverage_percent,students,ehcps,unplaced\nSurrey,7,full,100,1,1,1\n";
        let err = CatchmentImporter::from_reader(export.as_bytes()).expect_err("invalid pool");
        assert!(matches!(
            err,
            CatchmentImportError::InvalidPool { row: 1, value: 7, .. }
        ));
    }

    #[test]
    fn rejects_non_numeric_counts() {
        let export = "la_name,pool,coverage,coverage_percent,students,ehcps,unplaced\nSurrey,1,full,100,many,1,1\n";
        let err = CatchmentImporter::from_reader(export.as_bytes()).expect_err("invalid count");
        assert!(matches!(err, CatchmentImportError::Csv(_)));
    }
}
