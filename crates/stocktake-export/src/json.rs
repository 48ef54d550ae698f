//! JSON export of a whole inventory.

use std::io::Write;

use stocktake_core::Inventory;

use crate::error::ExportError;

/// Write an inventory (records, statistics and warnings) as JSON.
pub fn write_json<W: Write>(
    inventory: &Inventory,
    mut writer: W,
    pretty: bool,
) -> Result<(), ExportError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, inventory)?;
    } else {
        serde_json::to_writer(&mut writer, inventory)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
