//! Linter configuration.
//!
//! Configuration is read from a `sqflint.toml` file, usually found at the
//! root of a mission directory:
//!
//! ```toml
//! extensions = ["sqf", "fsm"]
//! exclude = ["addons/cba"]
//! private_directives = ["USES_VARIABLES"]
//! tables = ["commands.toml"]
//! ```
//!
//! Every field is optional.

use std::path::{Path, PathBuf};

use crate::analyzer::DEFAULT_PRIVATE_DIRECTIVES;
use crate::database::{Database, ExpressionTable};
use crate::error::{Error, Result};
use crate::util;

/// Name of the configuration file looked for by [`LintConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "sqflint.toml";

/// Number of parent directories searched for a configuration file.
pub const DISCOVERY_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LintConfig {
    /// Extensions of the files analyzed when walking a directory.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Path fragments excluded from directory walks.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_private_directives")]
    pub private_directives: Vec<String>,
    /// Expression tables overriding the built-in one.
    #[serde(default)]
    pub tables: Vec<PathBuf>,
    /// Only check the shape of operator usages, not operand types.
    #[serde(default)]
    pub scope_only: bool,

    /// Directory relative table paths are resolved against.
    #[serde(skip)]
    root: Option<PathBuf>,
}

fn default_extensions() -> Vec<String> {
    vec!["sqf".to_string()]
}

fn default_private_directives() -> Vec<String> {
    DEFAULT_PRIVATE_DIRECTIVES
        .iter()
        .map(|d| d.to_string())
        .collect()
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            private_directives: default_private_directives(),
            tables: Vec::new(),
            scope_only: false,
            root: None,
        }
    }
}

impl LintConfig {
    pub fn from_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the configuration at `path`. Tables are resolved relative to
    /// the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut config: LintConfig = util::deser_struct_from_path(path)?;
        config.root = path.parent().map(|p| p.to_path_buf());
        Ok(config)
    }

    /// Looks for a configuration file in `dir` and up to
    /// [`DISCOVERY_DEPTH`] of its parents.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let mut dir = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        for _ in 0..=DISCOVERY_DEPTH {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }
        None
    }

    /// Configuration applying to `dir`, the default one if none is found.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                debug!("using configuration at {}", path.display());
                Self::from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn table_path(&self, table: &Path) -> PathBuf {
        match &self.root {
            Some(root) if table.is_relative() => root.join(table),
            _ => table.to_path_buf(),
        }
    }

    /// Built-in database with the configured tables applied on top.
    pub fn database(&self) -> Result<Database> {
        let mut builder = Database::builder(Database::builtin().expressions().iter().cloned());
        for table in &self.tables {
            let path = self.table_path(table);
            let table = ExpressionTable::from_path(&path).map_err(|e| match e {
                Error::IoError(msg) => Error::IoError(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;
            debug!(
                "loaded {} table entries from {}",
                table.len(),
                path.display()
            );
            builder = builder.with_overrides(table.expressions()?);
        }
        let database = builder.build();
        if self.scope_only {
            Ok(database.untyped())
        } else {
            Ok(database)
        }
    }

    /// Whether `path` is excluded from directory walks.
    pub fn is_excluded(&self, path: &Path) -> bool {
        util::is_excluded(path, &self.exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LintConfig::from_str("").unwrap();
        assert_eq!(LintConfig::default(), config);
        assert_eq!(vec!["sqf".to_string()], config.extensions);
        assert_eq!(2, config.private_directives.len());
    }

    #[test]
    fn fields() {
        let config = LintConfig::from_str(
            r#"
            extensions = ["sqf", "fsm"]
            exclude = ["addons/cba"]
            scope_only = true
            "#,
        )
        .unwrap();
        assert_eq!(2, config.extensions.len());
        assert!(config.scope_only);
        assert!(config.is_excluded(Path::new("mission/addons/cba/init.sqf")));
        assert!(!config.is_excluded(Path::new("mission/init.sqf")));
    }

    #[test]
    fn invalid_toml() {
        match LintConfig::from_str("extensions = 1") {
            Err(Error::TomlDeserError(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_table() {
        let config = LintConfig {
            tables: vec![PathBuf::from("/nonexistent/commands.toml")],
            ..LintConfig::default()
        };
        assert!(config.database().is_err());
    }

    #[test]
    fn scope_only_database() {
        let config = LintConfig {
            scope_only: true,
            ..LintConfig::default()
        };
        let database = config.database().unwrap();
        assert!(database.len() <= Database::builtin().len());
    }
}
