use std::path::{Path, PathBuf};

/// Recursively collect every regular file under `directory`. The glob walk
/// yields a sorted order, which fixes the fold order of a merge run.
pub fn scan_report_files(directory: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = directory.join("**").join("*");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Input directory is not valid UTF-8: {:?}", directory))?;

    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                log::debug!("Error scanning input directory: {:?}", e);
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_scan_finds_nested_files_only() {
        let root = tempfile::tempdir().expect("failed to create temp directory");
        fs::write(root.path().join("a.xml"), "<a/>").unwrap();
        fs::create_dir_all(root.path().join("nested/deeper")).unwrap();
        fs::write(root.path().join("nested/b.xml"), "<b/>").unwrap();
        fs::write(root.path().join("nested/deeper/c.txt"), "not xml").unwrap();

        let files = scan_report_files(root.path()).unwrap();
        let mut names = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["a.xml", "b.xml", "c.txt"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let root = tempfile::tempdir().expect("failed to create temp directory");
        let files = scan_report_files(root.path()).unwrap();
        assert!(files.is_empty());
    }
}
