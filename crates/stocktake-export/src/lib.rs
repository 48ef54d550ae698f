//! Export of stocktake inventories.
//!
//! The CSV form is the contract with downstream analysis: one row per
//! record, preceded by a running row index in an unnamed first column.

mod csv_table;
mod error;
mod json;

use std::io::Write;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use stocktake_core::Inventory;

pub use csv_table::{CSV_HEADER, read_csv, write_csv};
pub use error::ExportError;
pub use json::write_json;

/// Output format for an inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// Delimited table, one row per record.
    #[default]
    Csv,
    /// The whole inventory, including statistics and warnings.
    Json,
}

/// Write an inventory in the given format.
pub fn export<W: Write>(
    inventory: &Inventory,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    tracing::debug!(%format, records = inventory.len(), "exporting inventory");
    match format {
        ExportFormat::Csv => write_csv(&inventory.records, writer),
        ExportFormat::Json => write_json(inventory, writer, true),
    }
}
