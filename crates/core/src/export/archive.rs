use crate::domain::report::ReportRecord;
use crate::export::document;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const ARCHIVE_NAME: &str = "FishReports.zip";

#[derive(Debug, Clone)]
pub struct ReportArchive {
    pub file_name: String,
    pub entries: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Zips one document per record, in the given order. Any failing record aborts
/// the whole archive.
pub fn build(records: &[ReportRecord], generated_at: DateTime<Utc>) -> anyhow::Result<ReportArchive> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        let doc = document::render(record, None, generated_at)
            .with_context(|| format!("failed to render report for {}", record.date))?;
        zip.start_file(doc.file_name.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", doc.file_name))?;
        zip.write_all(doc.body.as_bytes())
            .with_context(|| format!("failed to write {} to archive", doc.file_name))?;
        entries.push(doc.file_name);
    }

    let bytes = zip
        .finish()
        .context("failed to finish report archive")?
        .into_inner();

    Ok(ReportArchive {
        file_name: ARCHIVE_NAME.to_string(),
        entries,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::RiskLevel;
    use crate::store::tests::record;
    use std::io::Read;

    #[test]
    fn archive_holds_one_document_per_record() {
        let records = vec![
            record("2024-06-01", 99.1, RiskLevel::Low),
            record("2024-06-02", 99.2, RiskLevel::Medium),
            record("2024-06-03", 99.3, RiskLevel::High),
        ];
        let bundle = build(&records, Utc::now()).unwrap();
        assert_eq!(bundle.file_name, ARCHIVE_NAME);

        let mut zip = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        assert_eq!(zip.len(), 3);

        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "FishReport-2024-06-01.txt",
                "FishReport-2024-06-02.txt",
                "FishReport-2024-06-03.txt",
            ]
        );

        let mut body = String::new();
        zip.by_name("FishReport-2024-06-03.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert!(body.contains("Risk Level: High"));
        assert!(!body.contains(document::CHART_SECTION));
    }

    #[test]
    fn one_bad_record_aborts_archive() {
        let mut bad = record("2024-06-02", 99.2, RiskLevel::Low);
        bad.date = "2024/06/02".to_string();
        let records = vec![record("2024-06-01", 99.1, RiskLevel::Low), bad];

        let err = build(&records, Utc::now()).unwrap_err();
        assert!(format!("{err:#}").contains("2024/06/02"));
    }
}
