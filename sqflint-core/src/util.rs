//! Contains a collection of useful utility functions.

use std::ffi::OsStr;
use std::fs::{read, read_dir, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub fn read_text_file(path: &Path) -> Result<String> {
    trace!("reading {:?}", path);
    let mut fd = File::open(path)?;
    let mut content = String::new();
    fd.read_to_string(&mut content)?;
    Ok(content)
}

/// Create a static deser object from given path using serde.
pub fn deser_struct_from_path<T>(file_path: &Path) -> Result<T>
where
    for<'de> T: serde::Deserialize<'de>,
{
    let bytes = read(file_path)?;
    let extension = file_path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();
    let d: T = match extension.as_str() {
        "toml" => toml::from_slice(&bytes)?,
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yaml::from_slice(&bytes)?,
        _ => {
            return Err(Error::UnsupportedFileFormat(
                file_path.to_string_lossy().to_string(),
            ))
        }
    };
    Ok(d)
}

/// Get paths to files with any of the given extensions in the provided
/// directory, sorted. Paths containing any of the `exclude` fragments are
/// skipped.
pub fn find_files_with_extension(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
    exclude: &[String],
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    collect_files(dir, extensions, recursive, exclude, &mut paths);
    paths.sort();
    paths
}

fn collect_files(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
    exclude: &[String],
    paths: &mut Vec<PathBuf>,
) {
    if !dir.is_dir() {
        return;
    }
    let dir_entry = match read_dir(dir) {
        Ok(d) => d,
        _ => {
            error!("couldn't read directory at path: {}", dir.to_string_lossy());
            return;
        }
    };
    for entry in dir_entry {
        let path = match entry {
            Ok(p) => p.path(),
            _ => continue,
        };
        if is_excluded(&path, exclude) {
            trace!("excluded {:?}", path);
            continue;
        }
        if path.is_dir() && recursive {
            collect_files(&path, extensions, recursive, exclude, paths);
        } else if path.is_file() {
            let ext = path.extension().and_then(OsStr::to_str).unwrap_or("");
            if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                paths.push(path);
            }
        }
    }
}

/// Whether `path` contains any of the `exclude` fragments.
pub(crate) fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let path = path.to_string_lossy().replace('\\', "/");
    exclude
        .iter()
        .any(|fragment| !fragment.is_empty() && path.contains(fragment.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sqflint-util-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("sub/skip")).unwrap();
        dir
    }

    #[test]
    fn finds_sorted_files() {
        let dir = scratch_dir("find");
        fs::write(dir.join("b.sqf"), "").unwrap();
        fs::write(dir.join("a.SQF"), "").unwrap();
        fs::write(dir.join("c.txt"), "").unwrap();
        fs::write(dir.join("sub/d.sqf"), "").unwrap();
        fs::write(dir.join("sub/skip/e.sqf"), "").unwrap();

        let files = find_files_with_extension(
            &dir,
            &["sqf".to_string()],
            true,
            &["sub/skip".to_string()],
        );
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(vec!["a.SQF", "b.sqf", "sub/d.sqf"], names);

        let flat = find_files_with_extension(&dir, &["sqf".to_string()], false, &[]);
        assert_eq!(2, flat.len());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unsupported_extension() {
        let dir = scratch_dir("deser");
        let path = dir.join("config.ini");
        fs::write(&path, "").unwrap();
        let result: Result<toml::Value> = deser_struct_from_path(&path);
        match result {
            Err(Error::UnsupportedFileFormat(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
