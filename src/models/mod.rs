use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const CANONICAL_HEADER: [&str; 6] = ["datetime", "open", "high", "low", "close", "volume"];
pub const FIELD_COUNT: usize = 6;

/// Raw content of one input file.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    #[serde(rename = "utf-16le")]
    Utf16Le,
    #[serde(rename = "utf-8-sig")]
    Utf8Bom,
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
}

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf16Le => "utf-16le",
            SourceEncoding::Utf8Bom => "utf-8-sig",
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Latin1 => "latin-1",
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// `None` when every attempt failed and the bytes were decoded lossily.
    pub encoding: Option<SourceEncoding>,
    pub lossy: bool,
}

impl DecodedText {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    /// Tie-break order used by detection.
    pub const PREFERENCE: [Delimiter; 3] = [Delimiter::Comma, Delimiter::Semicolon, Delimiter::Tab];

    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => f.write_str("','"),
            Delimiter::Semicolon => f.write_str("';'"),
            Delimiter::Tab => f.write_str("'\\t'"),
        }
    }
}

/// A split input line forced to exactly six fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub fields: [String; FIELD_COUNT],
}

impl CandidateRow {
    pub fn from_fields<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields: [String; FIELD_COUNT] = Default::default();
        for (slot, part) in fields.iter_mut().zip(parts) {
            *slot = part.trim().to_string();
        }
        Self { fields }
    }

    pub fn datetime(&self) -> &str {
        &self.fields[0]
    }

    pub fn ohlc(&self) -> &[String] {
        &self.fields[1..5]
    }

    pub fn volume(&self) -> &str {
        &self.fields[5]
    }
}

/// One bar ready for the canonical output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
    pub datetime: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl ValidatedRow {
    pub fn to_record(&self) -> [&str; FIELD_COUNT] {
        [
            &self.datetime,
            &self.open,
            &self.high,
            &self.low,
            &self.close,
            &self.volume,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowStats {
    pub total: usize,
    pub invalid: usize,
}

impl RowStats {
    pub fn ratio(&self) -> f64 {
        self.invalid as f64 / self.total.max(1) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputDecision {
    OverwriteWithBackup,
    SideFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Normalized { backup: Option<PathBuf> },
    Diverted { side_file: PathBuf },
    SkippedEmpty,
    SkippedNoValidRows,
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub stats: RowStats,
    pub delimiter: Option<Delimiter>,
    pub encoding: Option<SourceEncoding>,
}

impl FileReport {
    pub fn new(path: PathBuf, outcome: FileOutcome) -> Self {
        Self {
            path,
            outcome,
            stats: RowStats::default(),
            delimiter: None,
            encoding: None,
        }
    }

    /// The single line printed for this file at the end of a run.
    pub fn summary_line(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string());
        let stats = format!(
            "{} rows, {} invalid ({:.1}%)",
            self.stats.total,
            self.stats.invalid,
            self.stats.ratio() * 100.0
        );

        match &self.outcome {
            FileOutcome::Normalized { backup: Some(bak) } => format!(
                "OK       {}: normalized in place, backup {} - {}",
                name,
                bak.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
                stats
            ),
            FileOutcome::Normalized { backup: None } => {
                format!("OK       {}: normalized in place, no backup - {}", name, stats)
            }
            FileOutcome::Diverted { side_file } => format!(
                "DIVERTED {}: too many invalid rows, wrote {} (original untouched) - {}",
                name,
                side_file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
                stats
            ),
            FileOutcome::SkippedEmpty => format!("SKIPPED  {}: empty or unreadable", name),
            FileOutcome::SkippedNoValidRows => {
                format!("SKIPPED  {}: no valid rows found - {}", name, stats)
            }
            FileOutcome::Failed { reason } => format!("ERROR    {}: {}", name, reason),
        }
    }
}
