//! Diagnostics reported to the user.

use std::fmt;

use crate::parser::ParseError;
use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Problem found in a script, located at a source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub position: Position,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: Position, severity: Severity, message: &str) -> Self {
        Self {
            position,
            severity,
            message: message.to_string(),
        }
    }

    pub fn error(position: Position, message: &str) -> Self {
        Self::new(position, Severity::Error, message)
    }

    pub fn warning(position: Position, message: &str) -> Self {
        Self::new(position, Severity::Warning, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Renders the diagnostic as a single line, `[line,column]:severity:message`.
    ///
    /// Columns are printed 0-based. Line breaks and tabs inside the message
    /// are escaped.
    pub fn to_line(&self) -> String {
        format!(
            "[{},{}]:{}:{}",
            self.position.line,
            self.position.column.saturating_sub(1),
            self.severity,
            escape(&self.message)
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_line())
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        Self::error(error.position(), error.message())
    }
}

fn escape(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the source line a diagnostic points at, with the diagnostic
/// annotated under it.
#[cfg(feature = "snippets")]
pub fn render_snippet(source: &str, origin: &str, diagnostic: &Diagnostic) -> String {
    use annotate_snippets::display_list::{DisplayList, FormatOptions};
    use annotate_snippets::snippet::{
        Annotation, AnnotationType, Slice, Snippet, SourceAnnotation,
    };

    let annotation_type = match diagnostic.severity {
        Severity::Error => AnnotationType::Error,
        Severity::Warning => AnnotationType::Warning,
    };
    let line = source
        .lines()
        .nth(diagnostic.position.line.saturating_sub(1))
        .unwrap_or("");
    // trailing space so that positions at the end of the line can be marked
    let line = format!("{} ", line);
    let range_start = line
        .char_indices()
        .nth(diagnostic.position.column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line.len() - 1);
    let range_end = line[range_start..]
        .chars()
        .next()
        .map(|c| range_start + c.len_utf8())
        .unwrap_or(line.len());

    let snippet = Snippet {
        title: Some(Annotation {
            label: Some(&diagnostic.message),
            id: None,
            annotation_type,
        }),
        footer: vec![],
        slices: vec![Slice {
            source: &line,
            line_start: diagnostic.position.line,
            origin: Some(origin),
            fold: false,
            annotations: vec![SourceAnnotation {
                label: "",
                annotation_type,
                range: (range_start, range_end),
            }],
        }],
        opt: FormatOptions {
            color: true,
            ..Default::default()
        },
    };

    DisplayList::from(snippet).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let diagnostic = Diagnostic::warning(Position::new(1, 14), "Local variable \"_z\"");
        assert_eq!("[1,13]:warning:Local variable \"_z\"", diagnostic.to_line());
        let diagnostic = Diagnostic::error(Position::new(3, 1), "a\nb\tc\r");
        assert_eq!("[3,0]:error:a\\nb\\tc\\r", diagnostic.to_line());
    }

    #[test]
    fn from_parse_error() {
        let error = ParseError::parenthesis(Position::new(1, 6), "Parenthesis \"(\" not closed");
        let diagnostic = Diagnostic::from(error);
        assert!(diagnostic.is_error());
        assert_eq!("[1,5]:error:Parenthesis \"(\" not closed", diagnostic.to_line());
    }

    #[cfg(feature = "snippets")]
    #[test]
    fn snippet_mentions_origin_and_message() {
        let diagnostic = Diagnostic::error(Position::new(2, 3), "something is off");
        let rendered = render_snippet("a = 1;\nb = ;", "init.sqf", &diagnostic);
        assert!(rendered.contains("init.sqf"));
        assert!(rendered.contains("something is off"));
        let rendered = render_snippet("", "empty.sqf", &Diagnostic::error(Position::new(4, 9), "x"));
        assert!(rendered.contains("empty.sqf"));
    }
}
