use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// Expand the command-line inputs into the ordered list of images to process.
///
/// Files are kept as given. A directory contributes the `.png` files directly
/// inside it, sorted by path.
pub fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            out.extend(pngs_in_dir(input)?);
        } else if input.is_file() {
            out.push(input.clone());
        } else {
            bail!("input not found: {}", input.display());
        }
    }

    if out.is_empty() {
        bail!("no PNG images selected");
    }
    Ok(out)
}

fn pngs_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to read directory {}", dir.display()))?;
        if entry.file_type().is_file() && is_png(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn directory_expands_to_sorted_pngs_only() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.PNG", "notes.txt", "c.jpg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.png"), b"x").unwrap();

        let images = collect_images(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            images,
            vec![dir.path().join("a.PNG"), dir.path().join("b.png")]
        );
    }

    #[test]
    fn explicit_files_keep_their_order() {
        let dir = tempdir().unwrap();
        let z = dir.path().join("z.png");
        let a = dir.path().join("a.png");
        fs::write(&z, b"x").unwrap();
        fs::write(&a, b"x").unwrap();

        let images = collect_images(&[z.clone(), a.clone()]).unwrap();
        assert_eq!(images, vec![z, a]);
    }

    #[test]
    fn missing_or_empty_inputs_are_errors() {
        let dir = tempdir().unwrap();
        assert!(collect_images(&[dir.path().join("missing.png")]).is_err());
        assert!(collect_images(&[dir.path().to_path_buf()]).is_err());
        assert!(collect_images(&[]).is_err());
    }
}
