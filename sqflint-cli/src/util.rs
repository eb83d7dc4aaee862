use anyhow::Result;
use std::io::{self, Read};
use std::path::Path;

/// Path of `file` relative to `dir`, with forward slashes.
pub(crate) fn relative_path(dir: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(dir).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn read_stdin() -> Result<String> {
    let mut source = String::new();
    io::stdin().read_to_string(&mut source)?;
    Ok(source)
}
