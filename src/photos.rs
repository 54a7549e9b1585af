// Photo import
// Captured images are copied into the app's photo folder as plant_<millis>.<ext>.
// Records only hold the resulting path; deleting a record leaves the file alone.

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_PHOTO_EXTENSION, PHOTO_PREFIX};
use crate::error::{LeafeonError, Result};

/// Copy `source` into `photos_dir` and return the new path.
pub fn import_photo(source: &Path, photos_dir: &Path) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(LeafeonError::Validation(format!(
            "Photo not found: {}",
            source.display()
        )));
    }

    fs::create_dir_all(photos_dir)?;

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| DEFAULT_PHOTO_EXTENSION.to_string());

    let millis = chrono::Utc::now().timestamp_millis();
    let mut dest = photos_dir.join(format!("{}{}.{}", PHOTO_PREFIX, millis, ext));

    if dest.exists() {
        dest = generate_unique_path(&dest)?;
    }

    fs::copy(source, &dest)?;
    log::debug!("Imported photo {} -> {}", source.display(), dest.display());

    Ok(dest)
}

/// Append _1, _2, ... to the file stem until the path is free
fn generate_unique_path(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plant");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_PHOTO_EXTENSION);

    for i in 1..1000 {
        let candidate = parent.join(format!("{}_{}.{}", stem, i, ext));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(LeafeonError::Other("Could not generate unique photo filename".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_copies_with_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("IMG_0042.JPG");
        fs::write(&source, b"jpeg bytes").unwrap();
        let photos = tmp.path().join("photos");

        let dest = import_photo(&source, &photos).unwrap();

        let name = dest.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(PHOTO_PREFIX), "unexpected name {}", name);
        assert!(name.ends_with(".jpg"));
        assert_eq!(dest.parent().unwrap(), photos.as_path());
        assert_eq!(fs::read(&dest).unwrap(), b"jpeg bytes");
        assert!(source.exists(), "source must be left in place");
    }

    #[test]
    fn test_import_never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("leaf.png");
        fs::write(&source, b"png").unwrap();
        let photos = tmp.path().join("photos");

        let paths: Vec<PathBuf> = (0..5).map(|_| import_photo(&source, &photos).unwrap()).collect();
        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(fs::read_dir(&photos).unwrap().count(), 5);
    }

    #[test]
    fn test_import_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = import_photo(&tmp.path().join("nope.jpg"), tmp.path()).unwrap_err();
        assert!(matches!(err, LeafeonError::Validation(_)));
    }

    #[test]
    fn test_unique_path_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        let taken = tmp.path().join("plant_1.jpg");
        fs::write(&taken, b"x").unwrap();
        let unique = generate_unique_path(&taken).unwrap();
        assert_eq!(unique, tmp.path().join("plant_1_1.jpg"));
    }
}
