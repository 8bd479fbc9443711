//! File helpers for the research data feed.

use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `lines` to `base_dir/<prefix>_<index>.txt`, creating the directory.
pub fn write_text_series(
    base_dir: impl AsRef<Path>,
    prefix: &str,
    index: usize,
    lines: &[String],
) -> io::Result<PathBuf> {
    let dir = base_dir.as_ref();
    create_dir_all(dir)?;
    let path = dir.join(format!("{prefix}_{index:04}.txt"));
    let mut writer = BufWriter::new(File::create(&path)?);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(path)
}
