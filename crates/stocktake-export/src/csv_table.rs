//! CSV table of inventory records.

use std::io::{Read, Write};

use stocktake_core::InventoryRecord;

use crate::error::ExportError;

/// Header row; the unnamed first column is the running row index.
pub const CSV_HEADER: [&str; 7] = [
    "",
    "name",
    "component",
    "variant",
    "size",
    "mimeType",
    "fileDescription",
];

/// Write records as CSV with a running index column.
pub fn write_csv<W: Write>(records: &[InventoryRecord], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(CSV_HEADER)?;
    for (index, record) in records.iter().enumerate() {
        csv.write_record([
            index.to_string().as_str(),
            record.name.as_str(),
            record.component.as_str(),
            record.variant.as_str(),
            record.size.to_string().as_str(),
            record.mime_type.as_str(),
            record.file_description.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Read records back from a CSV table written by [`write_csv`].
///
/// Columns are matched by header name, so the index column is ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<InventoryRecord>, ExportError> {
    let mut csv = csv::Reader::from_reader(reader);
    let records = csv
        .deserialize()
        .collect::<Result<Vec<InventoryRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_core::Classification;

    fn sample() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new(
                "/nix/store/abc-hello",
                "abc-hello",
                "base",
                4096,
                Classification::directory(),
            ),
            InventoryRecord::new(
                "/nix/store/abc-hello/bin/hello",
                "abc-hello",
                "base",
                14_288,
                Classification::sniffed(
                    "application/x-executable",
                    "ELF 64-bit LSB executable, x86-64",
                ),
            ),
        ]
    }

    #[test]
    fn test_header_and_index() {
        let mut out = Vec::new();
        write_csv(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], ",name,component,variant,size,mimeType,fileDescription");
        assert_eq!(
            lines[1],
            "0,/nix/store/abc-hello,abc-hello,base,4096,os/directory,Directory"
        );
        assert_eq!(
            lines[2],
            "1,/nix/store/abc-hello/bin/hello,abc-hello,base,14288,application/x-executable,\"ELF 64-bit LSB executable, x86-64\""
        );
    }

    #[test]
    fn test_read_back() {
        let mut out = Vec::new();
        write_csv(&sample(), &mut out).unwrap();

        let records = read_csv(out.as_slice()).unwrap();
        assert_eq!(records, sample());
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ",name,component,variant,size,mimeType,fileDescription\n"
        );
    }
}
