use crate::format::{parse_index, render_index};
use crate::{Error, Result, SearchIndex};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Read and parse an index file.
pub fn read_index(path: &Path) -> Result<SearchIndex> {
    if !path.exists() {
        return Err(Error::NotFound(format!("index file {}", path.display())));
    }
    let content = fs::read_to_string(path)?;
    parse_index(&content)
}

/// Render `index` and write it to `path`.
///
/// The content goes to a temporary file in the destination directory first and
/// is renamed into place, so readers never see a half-written index and a
/// failed build leaves the previous file untouched.
pub fn write_index(path: &Path, index: &SearchIndex) -> Result<String> {
    let rendered = render_index(index)?;
    write_atomic(path, &rendered)?;
    info!("Wrote {} records to {}", index.len(), path.display());
    Ok(rendered)
}

/// Write `content` to `path` via a temporary file and rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Persisted {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Whether the file at `path` already holds exactly `rendered`.
pub fn is_up_to_date(path: &Path, rendered: &str) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    Ok(fs::read_to_string(path)? == rendered)
}
