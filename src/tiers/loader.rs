//! Load card tier tables from CSV
//!
//! Expected columns: `tier,udis`, one row per tier.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{CardTier, TierTable};
use crate::error::{CatError, Result};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    tier: String,
    udis: f64,
}

/// Load tiers from any reader
pub fn load_tiers_from_reader<R: Read>(reader: R) -> Result<Vec<CardTier>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut tiers = Vec::new();

    for (idx, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let name = row.tier.trim();
        if name.is_empty() {
            return Err(CatError::TierTable(format!("row {} has an empty tier name", idx + 1)));
        }
        tiers.push(CardTier::new(name, row.udis));
    }

    Ok(tiers)
}

/// Load tiers from a CSV file
pub fn load_tiers(path: &Path) -> Result<Vec<CardTier>> {
    let file = File::open(path)?;
    load_tiers_from_reader(file)
}

impl TierTable {
    /// Build a table from a CSV file of tiers and a UDI value
    pub fn from_csv_path(path: &Path, udi_value: f64) -> Result<Self> {
        Self::new(udi_value, load_tiers(path)?)
    }

    pub fn from_csv_reader<R: Read>(reader: R, udi_value: f64) -> Result<Self> {
        Self::new(udi_value, load_tiers_from_reader(reader)?)
    }
}
