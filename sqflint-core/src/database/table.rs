//! Expression tables stored as data.
//!
//! A table lists operator signatures in three sections:
//!
//! ```toml
//! [[nular]]
//! name = "player"
//! returns = "OBJECT"
//!
//! [[unary]]
//! name = "hint"
//! rhs = "STRING"
//!
//! [[binary]]
//! name = "setDamage"
//! lhs = ["OBJECT", "LOCATION"]
//! rhs = "SCALAR"
//! ```
//!
//! Types are given either with their own names or with the names found in
//! engine command dumps. An operand listing several types produces one
//! expression per type.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ValueType;
use crate::util;

use super::Expression;

/// One or more type names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeList {
    One(String),
    Many(Vec<String>),
}

impl TypeList {
    fn types(&self) -> Result<Vec<ValueType>> {
        match self {
            TypeList::One(name) => Ok(vec![name.parse()?]),
            TypeList::Many(names) => names.iter().map(|n| n.parse()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NularEntry {
    pub name: String,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnaryEntry {
    pub name: String,
    pub rhs: TypeList,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryEntry {
    pub name: String,
    pub lhs: TypeList,
    pub rhs: TypeList,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpressionTable {
    #[serde(default)]
    pub nular: Vec<NularEntry>,
    #[serde(default)]
    pub unary: Vec<UnaryEntry>,
    #[serde(default)]
    pub binary: Vec<BinaryEntry>,
}

impl ExpressionTable {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads a table, choosing the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        util::deser_struct_from_path(path)
    }

    pub fn len(&self) -> usize {
        self.nular.len() + self.unary.len() + self.binary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expressions described by the table, in table order.
    pub fn expressions(&self) -> Result<Vec<Expression>> {
        let mut expressions = Vec::with_capacity(self.len());
        for entry in &self.nular {
            check_name(&entry.name)?;
            expressions.push(Expression::nullary(
                &entry.name,
                return_type(&entry.returns)?,
            ));
        }
        for entry in &self.unary {
            check_name(&entry.name)?;
            let returns = return_type(&entry.returns)?;
            for rhs in entry.rhs.types()? {
                expressions.push(Expression::unary(&entry.name, rhs, returns));
            }
        }
        for entry in &self.binary {
            check_name(&entry.name)?;
            let returns = return_type(&entry.returns)?;
            let rhs_types = entry.rhs.types()?;
            for lhs in entry.lhs.types()? {
                for rhs in &rhs_types {
                    expressions.push(Expression::binary(lhs, &entry.name, *rhs, returns));
                }
            }
        }
        Ok(expressions)
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidExpression(format!(
            "operator name \"{}\" must be a single word",
            name
        )));
    }
    Ok(())
}

/// `Nothing` and a missing return type both mean no value.
fn return_type(returns: &Option<String>) -> Result<Option<ValueType>> {
    match returns {
        None => Ok(None),
        Some(name) => match name.parse()? {
            ValueType::Nothing => Ok(None),
            value_type => Ok(Some(value_type)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Arity;

    #[test]
    fn entries_expand_per_type() {
        let table = ExpressionTable::from_toml_str(
            r#"
            [[nular]]
            name = "player"
            returns = "OBJECT"

            [[unary]]
            name = "hint"
            rhs = ["STRING", "TEXT"]

            [[binary]]
            name = "setDamage"
            lhs = ["OBJECT", "LOCATION"]
            rhs = "SCALAR"
            returns = "NOTHING"
            "#,
        )
        .unwrap();
        let expressions = table.expressions().unwrap();
        assert_eq!(5, expressions.len());
        assert_eq!(Arity::Nullary, expressions[0].arity());
        assert_eq!(Some(ValueType::Object), expressions[0].return_type());
        assert_eq!("hint", expressions[1].keyword());
        assert_eq!(Some(ValueType::String), expressions[2].rhs_type());
        assert_eq!("setDamage", expressions[3].keyword());
        assert_eq!(Some(ValueType::Object), expressions[3].lhs_type());
        assert_eq!(None, expressions[4].return_type());
    }

    #[test]
    fn unknown_types_are_rejected() {
        let table = ExpressionTable::from_toml_str(
            r#"
            [[unary]]
            name = "hint"
            rhs = "STRNG"
            "#,
        )
        .unwrap();
        match table.expressions() {
            Err(Error::InvalidValueType(message)) => assert!(message.contains("STRNG")),
            other => panic!("unexpected result {:?}", other.map(|e| e.len())),
        }
    }

    #[test]
    fn unsupported_extension() {
        let path = std::env::temp_dir().join("sqflint-table-test.json");
        std::fs::write(&path, "{}").unwrap();
        match ExpressionTable::from_path(&path) {
            Err(Error::UnsupportedFileFormat(_)) => (),
            other => panic!("unexpected result {:?}", other.map(|t| t.len())),
        }
        let _ = std::fs::remove_file(path);
    }
}
