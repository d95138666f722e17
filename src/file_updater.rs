use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn read_target(path: &Path) -> std::result::Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read target file {:?}: {}", path, e).into())
}

/// Replaces the contents of `path` by writing a sibling temp file and renaming
/// it over the original. The original is untouched if anything before the
/// rename fails.
pub fn write_atomically(
    path: &Path,
    content: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let permissions = std::fs::metadata(path)
        .map_err(|e| format!("Failed to stat target file {:?}: {}", path, e))?
        .permissions();

    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| format!("Failed to create temp file in {:?}: {}", dir, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| format!("Failed to write temp file for {:?}: {}", path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| format!("Failed to sync temp file for {:?}: {}", path, e))?;
    std::fs::set_permissions(temp.path(), permissions)
        .map_err(|e| format!("Failed to copy permissions to temp file for {:?}: {}", path, e))?;

    temp.persist(path)
        .map_err(|e| format!("Failed to replace {:?}: {}", path, e.error))?;

    Ok(())
}
