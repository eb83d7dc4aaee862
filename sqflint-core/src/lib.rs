//! This library implements static analysis of SQF mission scripts.
//!
//! Scripts are parsed losslessly into nested statements (see [`parser`]),
//! then walked by the [`Analyzer`], an abstract interpreter tracking the
//! types of variables across scopes and namespaces. Whatever it cannot make
//! sense of is reported as a [`Diagnostic`]: unclosed parenthesis, local
//! variables used outside of their scope, operators applied to the wrong
//! types, helper constructs (`if`, `for`, ...) left incomplete and so on.
//!
//! Operators are described by a [`Database`] of expressions. The built-in
//! one covers the language constructs and a table of engine commands,
//! which can be extended with tables of one's own through [`LintConfig`].
//!
//! # Using the library
//!
//! To use `sqflint-core` in your Rust project add the following to your
//! `Cargo.toml`:
//!
//! ```toml
//! sqflint-core = "0.1.0"
//! ```
//!
//! Loading expression tables from yaml requires the `yaml` feature.
//!
//! ## Example
//!
//! ```
//! use sqflint_core::{analyze, Severity};
//!
//! let diagnostics = analyze("if (alive player) then {hint str _unit};");
//! assert_eq!(1, diagnostics.len());
//! assert_eq!(Severity::Warning, diagnostics[0].severity);
//! ```
//!
//! [`Analyzer`]: analyzer::Analyzer
//! [`Database`]: database::Database

#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

// reexports
pub use analyzer::{analyze, Analyzer};
pub use config::LintConfig;
pub use database::Database;
pub use diagnostic::{Diagnostic, Severity};
pub use error::{Error, Result};
pub use parser::{parse, ParseError};
pub use types::{Code, Position, Token, Value, ValueType};

pub mod analyzer;
pub mod config;
pub mod database;
pub mod diagnostic;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod types;
pub mod util;
