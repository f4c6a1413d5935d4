// src/pipeline.rs
use crate::config::ToolConfig;
use crate::decode::decode_bytes;
use crate::error::{CsvToolError, Result};
use crate::models::{FileOutcome, FileReport, RawDocument};
use crate::output::{decide, OutputWriter, WrittenOutput};
use crate::rows::{NormalizedBatch, RowNormalizer};
use crate::sniff::{detect_delimiter, split_lines};
use log::{error, info, warn};
use std::fs;
use std::path::Path;

/// Everything the pipeline learns from a file before anything is written.
#[derive(Debug)]
pub enum Analysis {
    /// Nothing to write; the report carries the skip outcome.
    Skipped(FileReport),
    Ready {
        report: FileReport,
        batch: NormalizedBatch,
    },
}

impl Analysis {
    pub fn report(&self) -> &FileReport {
        match self {
            Analysis::Skipped(report) | Analysis::Ready { report, .. } => report,
        }
    }
}

/// Runs decode -> split -> sniff -> validate -> write for one file at a time.
pub struct CsvNormalizer {
    config: ToolConfig,
    rows: RowNormalizer,
}

impl CsvNormalizer {
    pub fn new(config: ToolConfig) -> Self {
        let rows = RowNormalizer::new(config.date_validation);
        Self { config, rows }
    }

    pub fn read(path: &Path) -> Result<RawDocument> {
        let bytes = fs::read(path).map_err(|e| CsvToolError::io(path, e))?;
        Ok(RawDocument {
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Pure part of the pipeline: no filesystem access.
    pub fn analyze(&self, doc: &RawDocument) -> Analysis {
        let decoded = decode_bytes(&doc.bytes, &self.config.encodings);
        let mut report = FileReport::new(doc.path.clone(), FileOutcome::SkippedEmpty);
        report.encoding = decoded.encoding;

        if decoded.lossy {
            warn!("{}: no encoding matched, decoded lossily", doc.path.display());
        }
        if decoded.is_blank() {
            return Analysis::Skipped(report);
        }

        let lines = split_lines(&decoded.text);
        let delimiter = detect_delimiter(&lines, self.config.delimiter_sample_lines);
        let batch = self.rows.normalize(&lines, delimiter);

        report.delimiter = Some(delimiter);
        report.stats = batch.stats;
        if batch.rows.is_empty() {
            report.outcome = FileOutcome::SkippedNoValidRows;
            return Analysis::Skipped(report);
        }
        Analysis::Ready { report, batch }
    }

    /// Process one file. Errors are returned, not logged; see [`Self::process_file_logged`].
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let doc = Self::read(path)?;
        let (mut report, batch) = match self.analyze(&doc) {
            Analysis::Ready { report, batch } => (report, batch),
            Analysis::Skipped(report) => {
                if report.outcome == FileOutcome::SkippedEmpty {
                    warn!("{}: empty or unreadable, skipped", path.display());
                } else {
                    warn!(
                        "{}: no valid rows found (delimiter {}), original left as is",
                        path.display(),
                        report.delimiter.unwrap_or_default()
                    );
                }
                return Ok(report);
            }
        };

        info!(
            "{}: {} rows, {} invalid ({:.1}%), delimiter {}",
            path.display(),
            report.stats.total,
            report.stats.invalid,
            report.stats.ratio() * 100.0,
            report.delimiter.unwrap_or_default()
        );

        let decision = decide(&report.stats, self.config.tolerance, self.config.overwrite_policy);
        report.outcome = match OutputWriter::new(&self.config).write(path, &batch.rows, decision)? {
            WrittenOutput::Overwritten { backup } => FileOutcome::Normalized { backup },
            WrittenOutput::SideFile(side_file) => FileOutcome::Diverted { side_file },
        };
        Ok(report)
    }

    /// Like [`Self::process_file`], but an error becomes a `Failed` report.
    pub fn process_file_logged(&self, path: &Path) -> FileReport {
        match self.process_file(path) {
            Ok(report) => report,
            Err(e) => {
                error!("{}: {}", path.display(), e);
                FileReport::new(
                    path.to_path_buf(),
                    FileOutcome::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Delimiter, RowStats};
    use std::path::PathBuf;

    fn doc(text: &str) -> RawDocument {
        RawDocument {
            path: PathBuf::from("TEST.csv"),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_analyze_semicolon_example() {
        let normalizer = CsvNormalizer::new(ToolConfig::default());
        let analysis = normalizer.analyze(&doc(
            "datetime,open,high,low,close,volume\r\n\
             1993.04.12 00:00;1.1;1.2;1.0;1.15;100\r\n\
             1993.04.13 00:00;1.15;1.3;1.1;1.2;250\r\n",
        ));

        let (report, batch) = match analysis {
            Analysis::Ready { report, batch } => (report, batch),
            other => panic!("unexpected analysis {:?}", other),
        };
        assert_eq!(report.delimiter, Some(Delimiter::Semicolon));
        assert!(batch.header_consumed);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(
            batch.rows[0].to_record(),
            ["1993-04-12 00:00", "1.1", "1.2", "1.0", "1.15", "100"]
        );
    }

    #[test]
    fn test_analyze_blank_file() {
        let normalizer = CsvNormalizer::new(ToolConfig::default());
        let analysis = normalizer.analyze(&doc(" \r\n\r\n"));
        assert_eq!(analysis.report().outcome, FileOutcome::SkippedEmpty);
        assert_eq!(analysis.report().stats, RowStats::default());
    }

    #[test]
    fn test_analyze_no_valid_rows() {
        let normalizer = CsvNormalizer::new(ToolConfig::default());
        let analysis = normalizer.analyze(&doc("datetime,open,high,low,close\nfoo,bar,baz,qux,quux\n"));
        assert_eq!(analysis.report().outcome, FileOutcome::SkippedNoValidRows);
        assert_eq!(analysis.report().stats, RowStats { total: 1, invalid: 1 });
    }

    #[test]
    fn test_missing_file_becomes_failed_report() {
        let normalizer = CsvNormalizer::new(ToolConfig::default());
        let report = normalizer.process_file_logged(Path::new("/definitely/not/here.csv"));
        assert!(report.outcome.is_failure());
    }
}
