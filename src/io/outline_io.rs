//! Save-file reading and writing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::item::Item;
use crate::model::tree::Tree;
use crate::parse::{parse_outline, serialize_outline};

/// Error type for outline file I/O.
#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load the outline from disk. A missing file starts an empty outline.
pub fn load_outline(path: &Path) -> Result<Tree<Item>, OutlineError> {
    if !path.exists() {
        return Ok(parse_outline(""));
    }
    let text = fs::read_to_string(path).map_err(|e| OutlineError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_outline(&text))
}

/// Write the outline to disk, creating the parent directory on demand.
/// The write goes through a temp file + rename so an interrupted save
/// never truncates the existing file.
pub fn save_outline(path: &Path, tree: &Tree<Item>) -> Result<(), OutlineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| OutlineError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let mut text = serialize_outline(tree);
    if !text.is_empty() {
        text.push('\n');
    }
    atomic_write(path, text.as_bytes()).map_err(|e| OutlineError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_empty_outline() {
        let tmp = TempDir::new().unwrap();
        let tree = load_outline(&tmp.path().join("nope")).unwrap();
        assert!(!tree.has_children(tree.root()));
    }

    #[test]
    fn outline_survives_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("outline");
        let tree = parse_outline("- A\n  - B\n- C");
        save_outline(&path, &tree).unwrap();
        let loaded = load_outline(&path).unwrap();
        assert!(tree.equivalent(tree.root(), &loaded, loaded.root()));
    }

    #[test]
    fn empty_outline_writes_empty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("outline");
        save_outline(&path, &parse_outline("")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
