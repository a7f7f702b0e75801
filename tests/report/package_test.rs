#[cfg(test)]
mod tests {
    use findmeasure::report::{
        encode_utf16le, LoadOptions, PackageError, PowerBIReport, ReportError, ReportPackage,
        ZipReportPackage, CONNECTIONS_ENTRY, LAYOUT_ENTRY,
    };
    use findmeasure::semantic::SemanticModel;
    use findmeasure::warnings::WarningBus;
    use serde_json::json;
    use std::fs;
    use std::io::{Cursor, Write};
    use std::path::{Path, PathBuf};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Helper to build a zip archive in memory
    fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn card_layout() -> String {
        let config = json!({
            "name": "card1",
            "singleVisual": {
                "visualType": "card",
                "prototypeQuery": {
                    "From": [{"Name": "s", "Entity": "Sales", "Type": 0}],
                    "Select": [{"Measure": {"Expression": {"SourceRef": {"Source": "s"}}, "Property": "Total Sales"}}]
                }
            }
        });
        json!({
            "sections": [{
                "name": "ReportSection",
                "displayName": "Überblick",
                "config": "{}",
                "visualContainers": [{"config": config.to_string()}]
            }]
        })
        .to_string()
    }

    fn pbix_bytes() -> Vec<u8> {
        zip_bytes(&[
            ("Version", b"1.28".to_vec()),
            (LAYOUT_ENTRY, encode_utf16le(&card_layout())),
            ("DataModel", vec![0u8; 16]),
        ])
    }

    /// Write `bytes` to a file unique to this test
    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("findmeasure-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_zip_package_reads_entries() {
        let mut package = ZipReportPackage::from_reader(Cursor::new(pbix_bytes())).unwrap();

        let mut names: Vec<&str> = package.entry_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["DataModel", "Report/Layout", "Version"]);

        let layout = package.read_entry(LAYOUT_ENTRY).unwrap().unwrap();
        assert_eq!(layout, encode_utf16le(&card_layout()));
        assert!(package.read_entry(CONNECTIONS_ENTRY).unwrap().is_none());
    }

    #[test]
    fn test_load_from_zip_reader() {
        let mut package = ZipReportPackage::from_reader(Cursor::new(pbix_bytes())).unwrap();
        let mut model = SemanticModel::disconnected("Local");
        let bus = WarningBus::new();

        let report = PowerBIReport::load(
            &mut package,
            Path::new("Store Sales.pbix"),
            &mut model,
            &LoadOptions::default(),
            &bus,
        )
        .unwrap();

        assert_eq!(report.name(), "Store Sales");
        assert_eq!(report.pages()[0].display_name(), "Überblick");
        assert_eq!(report.all_visuals().count(), 1);
        assert!(model.find_measure("Total Sales").is_some());
    }

    #[test]
    fn test_load_from_package_file() {
        let path = temp_file("Store Sales.pbix", &pbix_bytes());
        let mut model = SemanticModel::disconnected("Local");
        let bus = WarningBus::new();

        let report =
            PowerBIReport::load_from_package(&path, &mut model, &LoadOptions::default(), &bus)
                .unwrap();
        assert_eq!(report.name(), "Store Sales");
        assert_eq!(report.path(), path.as_path());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_layout_entry() {
        let bytes = zip_bytes(&[("Version", b"1.28".to_vec())]);
        let mut package = ZipReportPackage::from_reader(Cursor::new(bytes)).unwrap();
        let mut model = SemanticModel::disconnected("Local");
        let bus = WarningBus::new();

        let err = PowerBIReport::load(
            &mut package,
            Path::new("Empty.pbix"),
            &mut model,
            &LoadOptions::default(),
            &bus,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::MissingEntry { entry: LAYOUT_ENTRY, .. }));
        assert!(err.to_string().contains("Empty"));
        assert_eq!(model.tables().count(), 0);
    }

    #[test]
    fn test_oversized_entry_is_refused() {
        let layout_len = encode_utf16le(&card_layout()).len() as u64;
        let mut package = ZipReportPackage::from_reader(Cursor::new(pbix_bytes()))
            .unwrap()
            .with_max_entry_bytes(64);

        let err = package.read_entry(LAYOUT_ENTRY).unwrap_err();
        assert!(matches!(
            err,
            PackageError::EntryTooLarge { ref entry, size, limit: 64 }
                if entry == LAYOUT_ENTRY && size == layout_len
        ));
        // entries under the cap are still readable
        assert_eq!(package.read_entry("Version").unwrap().unwrap(), b"1.28");

        let mut model = SemanticModel::disconnected("Local");
        let bus = WarningBus::new();
        let err = PowerBIReport::load(
            &mut package,
            Path::new("Huge.pbix"),
            &mut model,
            &LoadOptions::default(),
            &bus,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Package(PackageError::EntryTooLarge { .. })));
        assert_eq!(model.tables().count(), 0);
    }

    #[test]
    fn test_not_a_zip_archive() {
        let result = ZipReportPackage::from_reader(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(PackageError::Archive(_))));
    }

    #[test]
    fn test_missing_file() {
        let mut model = SemanticModel::disconnected("Local");
        let bus = WarningBus::new();
        let err = PowerBIReport::load_from_package(
            "/nonexistent/findmeasure/Missing.pbix",
            &mut model,
            &LoadOptions::default(),
            &bus,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Package(PackageError::Open { .. })));
    }
}
