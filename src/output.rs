// src/output.rs
use crate::config::{OverwritePolicy, ToolConfig};
use crate::error::{CsvToolError, Result};
use crate::models::{OutputDecision, RowStats, ValidatedRow, CANONICAL_HEADER};
use csv::{Terminator, WriterBuilder};
use log::{info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Where the rows of one file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrittenOutput {
    Overwritten { backup: Option<PathBuf> },
    SideFile(PathBuf),
}

pub fn decide(stats: &RowStats, tolerance: f64, policy: OverwritePolicy) -> OutputDecision {
    match policy {
        OverwritePolicy::Always => OutputDecision::OverwriteWithBackup,
        OverwritePolicy::Never => OutputDecision::SideFile,
        OverwritePolicy::Conditional if stats.ratio() <= tolerance => {
            OutputDecision::OverwriteWithBackup
        }
        OverwritePolicy::Conditional => OutputDecision::SideFile,
    }
}

/// `EURUSD.csv` -> `EURUSD.csv.bak`
pub fn backup_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(extension);
    path.with_file_name(name)
}

/// `EURUSD.csv` -> `EURUSD_FIXED.csv`
pub fn side_file_path(path: &Path, marker: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{}{}.csv", stem, marker))
}

/// Serialize the canonical header and rows.
pub fn write_canonical<W: Write>(writer: W, rows: &[ValidatedRow]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CANONICAL_HEADER)?;
    for row in rows {
        wtr.write_record(row.to_record())?;
    }
    wtr.flush().map_err(|e| CsvToolError::Csv(e.into()))?;
    Ok(())
}

pub fn render_canonical(rows: &[ValidatedRow]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_canonical(&mut buf, rows)?;
    Ok(buf)
}

/// Applies an [`OutputDecision`] to one source file.
pub struct OutputWriter<'a> {
    config: &'a ToolConfig,
}

impl<'a> OutputWriter<'a> {
    pub fn new(config: &'a ToolConfig) -> Self {
        Self { config }
    }

    pub fn write(
        &self,
        path: &Path,
        rows: &[ValidatedRow],
        decision: OutputDecision,
    ) -> Result<WrittenOutput> {
        match decision {
            OutputDecision::OverwriteWithBackup => self.overwrite_with_backup(path, rows),
            OutputDecision::SideFile => self.write_side_file(path, rows),
        }
    }

    fn overwrite_with_backup(&self, path: &Path, rows: &[ValidatedRow]) -> Result<WrittenOutput> {
        let bak = backup_path(path, &self.config.backup_extension);
        let backup = match fs::copy(path, &bak) {
            Ok(_) => {
                info!("Backup written to {}", bak.display());
                Some(bak)
            }
            Err(e) => {
                warn!("Could not back up {}: {} (overwriting anyway)", path.display(), e);
                None
            }
        };

        atomic_replace(path, rows)?;
        info!("Overwrote {}", path.display());
        Ok(WrittenOutput::Overwritten { backup })
    }

    fn write_side_file(&self, path: &Path, rows: &[ValidatedRow]) -> Result<WrittenOutput> {
        let out = side_file_path(path, &self.config.side_file_marker);
        let file = fs::File::create(&out).map_err(|e| CsvToolError::io(&out, e))?;
        write_canonical(file, rows)?;
        warn!(
            "Too many invalid rows in {}, wrote {} and left the original untouched",
            path.display(),
            out.display()
        );
        Ok(WrittenOutput::SideFile(out))
    }
}

/// Write to a temp file next to `path`, then rename it over `path`.
///
/// The temp file is deleted when dropped, so no error path leaves it behind.
fn atomic_replace(path: &Path, rows: &[ValidatedRow]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".csvfix-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CsvToolError::io(dir, e))?;

    write_canonical(tmp.as_file_mut(), rows)?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CsvToolError::io(tmp.path(), e))?;

    // tempfile creates 0600; keep the mode of the file being replaced
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_file() {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| CsvToolError::io(tmp.path(), e))?;
        }
    }

    persist(tmp, path)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path).map_err(|e| CsvToolError::TempPersist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
