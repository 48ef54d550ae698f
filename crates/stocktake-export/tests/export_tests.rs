use std::fs;

use stocktake_export::{ExportFormat, export, read_csv, write_json};
use stocktake_scan::{Crawler, RootSpec};
use tempfile::TempDir;

fn crawled_store() -> (TempDir, stocktake_scan::Inventory) {
    let temp = TempDir::new().unwrap();
    let store = temp.path().join("store");
    fs::create_dir_all(store.join("abc-hello/bin")).unwrap();
    fs::write(store.join("abc-hello/bin/hello"), "#!/bin/sh\necho hello\n").unwrap();
    fs::write(store.join("def-data"), [0u8, 159, 146, 150]).unwrap();

    let inventory = Crawler::new()
        .crawl("slim", &RootSpec::directory(&store))
        .unwrap();
    (temp, inventory)
}

#[test]
fn test_csv_export_roundtrip_through_file() {
    let (temp, inventory) = crawled_store();
    let out_path = temp.path().join("slim.csv");

    export(&inventory, ExportFormat::Csv, fs::File::create(&out_path).unwrap()).unwrap();

    let text = fs::read_to_string(&out_path).unwrap();
    let rows: Vec<_> = text.lines().skip(1).collect();
    assert_eq!(rows.len(), inventory.len());
    for (index, row) in rows.iter().enumerate() {
        assert!(row.starts_with(&format!("{index},")));
    }

    let records = read_csv(fs::File::open(&out_path).unwrap()).unwrap();
    assert_eq!(records, inventory.records);
    assert!(records.iter().all(|r| r.variant == "slim"));
}

#[test]
fn test_csv_rows_preserve_classification() {
    let (_temp, inventory) = crawled_store();

    let mut out = Vec::new();
    export(&inventory, ExportFormat::Csv, &mut out).unwrap();
    let records = read_csv(out.as_slice()).unwrap();

    let script = records
        .iter()
        .find(|r| r.name.ends_with("bin/hello"))
        .unwrap();
    assert_eq!(script.mime_type, "text/x-shellscript");
    assert_eq!(script.component, "abc-hello");

    let data = records.iter().find(|r| r.name.ends_with("def-data")).unwrap();
    assert_eq!(data.mime_type, "application/octet-stream");
    assert_eq!(data.size, 4);
}

#[test]
fn test_json_export_includes_stats() {
    let (_temp, inventory) = crawled_store();

    let mut out = Vec::new();
    write_json(&inventory, &mut out, false).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["variant"], "slim");
    assert_eq!(
        value["records"].as_array().unwrap().len(),
        inventory.len()
    );
    assert_eq!(value["stats"]["total_files"], 2);
    assert_eq!(value["records"][0]["mimeType"], "os/directory");
}
