//! Application definition.

extern crate simplelog;

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Error, Result};
use clap::{App, Arg, ArgMatches};

use sqflint::analyzer::Analyzer;
use sqflint::{Database, Diagnostic, LintConfig, Severity};

use crate::util;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &'static str = env!("CARGO_PKG_AUTHORS");

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("sqflint")
        .version(VERSION)
        .author(AUTHORS)
        .about("Static analyzer for SQF mission scripts.\n\
                Reads the script from stdin when no file or directory is given.")
        .arg(Arg::with_name("file")
            .value_name("file")
            .index(1)
            .help("Script to analyze"))
        .arg(Arg::with_name("directory")
            .long("directory")
            .short("d")
            .takes_value(true)
            .value_name("dir")
            .conflicts_with("file")
            .help("Analyze every script found in the directory, recursively"))
        .arg(Arg::with_name("output")
            .long("output")
            .short("o")
            .takes_value(true)
            .value_name("file")
            .help("Write the diagnostics to a file instead of stdout"))
        .arg(Arg::with_name("exit-code")
            .long("exit-code")
            .short("e")
            .takes_value(true)
            .possible_values(&["e", "w"])
            .value_name("severity")
            .help("Exit with status 1 on errors (e) or on errors and warnings (w)"))
        .arg(Arg::with_name("config")
            .long("config")
            .short("c")
            .takes_value(true)
            .value_name("file")
            .help("Configuration file, looked for next to the analyzed files if not given"))
        .arg(Arg::with_name("pretty")
            .long("pretty")
            .help("Show the annotated source of every diagnostic"))
        .arg(Arg::with_name("verbosity")
            .long("verbosity")
            .short("v")
            .takes_value(true)
            .default_value("warn")
            .value_name("verb")
            .help("Set the verbosity of the log output"))
}

pub fn app_matches() -> ArgMatches<'static> {
    app().get_matches()
}

/// Diagnostics making the program exit with a failure status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitPolicy {
    Never,
    Errors,
    Warnings,
}

impl ExitPolicy {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("e") => ExitPolicy::Errors,
            Some("w") => ExitPolicy::Warnings,
            _ => ExitPolicy::Never,
        }
    }

    pub fn exit_code(&self, diagnostics: &[Diagnostic]) -> i32 {
        let failing = match self {
            ExitPolicy::Never => false,
            ExitPolicy::Errors => diagnostics.iter().any(|d| d.severity == Severity::Error),
            ExitPolicy::Warnings => !diagnostics.is_empty(),
        };
        if failing {
            1
        } else {
            0
        }
    }
}

/// Analyzes scripts and writes out what was found.
pub struct Linter {
    config: LintConfig,
    database: Database,
    #[cfg_attr(not(feature = "snippets"), allow(dead_code))]
    pretty: bool,
}

impl Linter {
    pub fn new(config: LintConfig, pretty: bool) -> Result<Self> {
        let database = config.database()?;
        debug!("database with {} expressions", database.len());
        #[cfg(not(feature = "snippets"))]
        {
            if pretty {
                warn!("annotated output not available, printing plain diagnostics");
            }
        }
        Ok(Self {
            config,
            database,
            pretty,
        })
    }

    pub fn lint(&self, source: &str) -> Vec<Diagnostic> {
        let mut analyzer = Analyzer::with_database(&self.database)
            .with_private_directives(self.config.private_directives.clone());
        analyzer.analyze(source);
        analyzer.into_diagnostics()
    }

    /// Writes diagnostics found in `source`, each line prefixed by
    /// `indent`.
    #[cfg_attr(not(feature = "snippets"), allow(unused_variables))]
    pub fn write_diagnostics(
        &self,
        out: &mut dyn Write,
        source: &str,
        origin: &str,
        diagnostics: &[Diagnostic],
        indent: &str,
    ) -> io::Result<()> {
        for diagnostic in diagnostics {
            #[cfg(feature = "snippets")]
            {
                if self.pretty {
                    let snippet = sqflint::diagnostic::render_snippet(source, origin, diagnostic);
                    for line in snippet.lines() {
                        writeln!(out, "{}{}", indent, line)?;
                    }
                    continue;
                }
            }
            writeln!(out, "{}{}", indent, diagnostic.to_line())?;
        }
        Ok(())
    }

    /// Analyzes a single script.
    pub fn lint_file(&self, path: &Path, out: &mut dyn Write) -> Result<Vec<Diagnostic>> {
        let source = sqflint::util::read_text_file(path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        let diagnostics = self.lint(&source);
        self.write_diagnostics(out, &source, &path.to_string_lossy(), &diagnostics, "")?;
        Ok(diagnostics)
    }

    /// Analyzes every script of a directory. Files with diagnostics are
    /// listed by their path relative to `dir`, followed by their
    /// diagnostics.
    pub fn lint_directory(&self, dir: &Path, out: &mut dyn Write) -> Result<Vec<Diagnostic>> {
        if !dir.is_dir() {
            return Err(Error::msg(format!("{} is not a directory", dir.display())));
        }
        let files = sqflint::util::find_files_with_extension(
            dir,
            &self.config.extensions,
            true,
            &self.config.exclude,
        );
        info!("analyzing {} files in {}", files.len(), dir.display());

        let mut all = Vec::new();
        for file in files {
            let source = match sqflint::util::read_text_file(&file) {
                Ok(source) => source,
                Err(e) => {
                    warn!("skipping {}: {}", file.display(), e);
                    continue;
                }
            };
            let diagnostics = self.lint(&source);
            if diagnostics.is_empty() {
                continue;
            }
            let relative = util::relative_path(dir, &file);
            writeln!(out, "{}", relative)?;
            self.write_diagnostics(out, &source, &relative, &diagnostics, "\t")?;
            all.extend(diagnostics);
        }
        Ok(all)
    }

    /// Analyzes a script read from stdin.
    pub fn lint_stdin(&self, out: &mut dyn Write) -> Result<Vec<Diagnostic>> {
        let source = util::read_stdin()?;
        let diagnostics = self.lint(&source);
        self.write_diagnostics(out, &source, "<stdin>", &diagnostics, "")?;
        Ok(diagnostics)
    }
}

/// Runs the program, returning its exit status.
pub fn start(matches: ArgMatches) -> Result<i32> {
    setup_log_verbosity(&matches)?;

    let directory = matches.value_of("directory").map(PathBuf::from);
    let file = matches.value_of("file").map(PathBuf::from);

    let config = match matches.value_of("config") {
        Some(path) => LintConfig::from_path(Path::new(path))
            .with_context(|| format!("failed loading configuration at {}", path))?,
        None => {
            let start_dir = match (&directory, &file) {
                (Some(dir), _) => dir.clone(),
                (None, Some(file)) => file
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".")),
                (None, None) => env::current_dir()?,
            };
            LintConfig::discover(&start_dir)?
        }
    };
    let linter = Linter::new(config, matches.is_present("pretty"))?;

    let mut out: Box<dyn Write> = match matches.value_of("output") {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed creating {}", path))?,
        ),
        None => Box::new(io::stdout()),
    };

    let diagnostics = match (&directory, &file) {
        (Some(dir), _) => linter.lint_directory(dir, &mut out)?,
        (None, Some(file)) => linter.lint_file(file, &mut out)?,
        (None, None) => linter.lint_stdin(&mut out)?,
    };
    out.flush()?;

    let policy = ExitPolicy::from_arg(matches.value_of("exit-code"));
    Ok(policy.exit_code(&diagnostics))
}

fn setup_log_verbosity(matches: &ArgMatches) -> Result<()> {
    use self::simplelog::{LevelFilter, TermLogger};
    let level_filter = match matches.value_of("verbosity") {
        Some(s) => match s {
            "0" | "none" => LevelFilter::Off,
            "1" | "err" | "error" | "min" => LevelFilter::Error,
            "2" | "warn" | "warning" | "default" => LevelFilter::Warn,
            "3" | "info" => LevelFilter::Info,
            "4" | "debug" => LevelFilter::Debug,
            "5" | "trace" | "max" | "all" => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        },
        _ => LevelFilter::Warn,
    };
    let mut config_builder = simplelog::ConfigBuilder::new();
    let logger_conf = config_builder
        .set_time_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Error)
        .set_time_format_str("%H:%M:%S%.6f")
        .build();
    // stdout is reserved for diagnostics
    TermLogger::init(level_filter, logger_conf, simplelog::TerminalMode::Stderr)
        .map_err(|e| Error::msg(format!("failed setting up logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("sqflint-cli-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn linter() -> Linter {
        Linter::new(LintConfig::default(), false).unwrap()
    }

    #[test]
    fn arguments() {
        let matches = app()
            .get_matches_from_safe(vec!["sqflint", "--directory", "tests/test_dir", "-e", "w"])
            .unwrap();
        assert_eq!(Some("tests/test_dir"), matches.value_of("directory"));
        assert_eq!(Some("warn"), matches.value_of("verbosity"));
        assert_eq!(
            ExitPolicy::Warnings,
            ExitPolicy::from_arg(matches.value_of("exit-code"))
        );

        assert!(app()
            .get_matches_from_safe(vec!["sqflint", "-e", "x"])
            .is_err());
        assert!(app()
            .get_matches_from_safe(vec!["sqflint", "init.sqf", "-d", "."])
            .is_err());
    }

    #[test]
    fn logger_setup_failure_is_reported() {
        let matches = app()
            .get_matches_from_safe(vec!["sqflint", "-v", "none"])
            .unwrap();
        let _ = setup_log_verbosity(&matches);
        // a logger can only be installed once per process
        assert!(setup_log_verbosity(&matches).is_err());
    }

    #[test]
    fn exit_codes() {
        let warning = linter().lint("hint _x");
        assert_eq!(1, warning.len());
        assert_eq!(0, ExitPolicy::Never.exit_code(&warning));
        assert_eq!(0, ExitPolicy::Errors.exit_code(&warning));
        assert_eq!(1, ExitPolicy::Warnings.exit_code(&warning));

        let error = linter().lint("hint (_x");
        assert_eq!(1, ExitPolicy::Errors.exit_code(&error));
        assert_eq!(0, ExitPolicy::Warnings.exit_code(&[]));
    }

    #[test]
    fn single_file() {
        let dir = scratch_dir("file");
        let path = dir.join("test.sqf");
        fs::write(&path, "hint _x").unwrap();

        let mut out = Vec::new();
        let diagnostics = linter().lint_file(&path, &mut out).unwrap();
        assert_eq!(1, diagnostics.len());
        assert_eq!(
            "[1,5]:warning:Local variable \"_x\" is not from this scope (not private)\n",
            String::from_utf8(out).unwrap()
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "snippets")]
    #[test]
    fn pretty_output_names_the_file() {
        let dir = scratch_dir("pretty");
        fs::write(dir.join("init.sqf"), "hint _x").unwrap();

        let linter = Linter::new(LintConfig::default(), true).unwrap();
        let mut out = Vec::new();
        linter.lint_directory(&dir, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("init.sqf\n\t"));
        assert!(out.contains("hint _x"));
        assert!(out.contains("not from this scope"));
        assert!(!out.contains("[1,5]:warning"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn directory() {
        let dir = scratch_dir("dir");
        fs::write(dir.join("test.sqf"), "hint _x").unwrap();
        fs::write(dir.join("test1.sqf"), "hint _y").unwrap();
        fs::write(dir.join("clean.sqf"), "hint \"ok\"").unwrap();
        fs::write(dir.join("notes.txt"), "hint _z").unwrap();

        let mut out = Vec::new();
        let diagnostics = linter().lint_directory(&dir, &mut out).unwrap();
        assert_eq!(2, diagnostics.len());
        assert_eq!(
            "test.sqf\n\t[1,5]:warning:Local variable \"_x\" is not from this scope (not private)\n\
             test1.sqf\n\t[1,5]:warning:Local variable \"_y\" is not from this scope (not private)\n",
            String::from_utf8(out).unwrap()
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory() {
        let mut out = Vec::new();
        assert!(linter()
            .lint_directory(Path::new("/nonexistent/sqflint"), &mut out)
            .is_err());
    }
}
