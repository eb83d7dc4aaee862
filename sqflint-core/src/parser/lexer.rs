//! Splits source text into raw pieces.
//!
//! Every delimiter becomes a piece of its own, and so does every non-empty
//! run of text between two delimiters. Joining the pieces gives back the
//! source text.

/// Delimiters, longest first so that e.g. `==` wins over `=`.
static DELIMITERS: &[&str] = &[
    "\\\r\n", "\\\n", "\r\n", "/*", "*/", "//", "==", "!=", "<=", ">=", ">>", "&&", "||", "\"",
    "'", " ", "\t", "\n", "=", "<", ">", "!", "+", "-", "*", "/", "%", "^", ":", "{", "}", "(",
    ")", "[", "]", ";", ",",
];

/// Splits `source` into pieces.
pub fn tokenize(source: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while index < source.len() {
        let rest = &source[index..];
        match match_delimiter(rest, &source[start..index]) {
            Some(delimiter) => {
                if start < index {
                    pieces.push(&source[start..index]);
                }
                pieces.push(&rest[..delimiter.len()]);
                index += delimiter.len();
                start = index;
            }
            None => {
                // advance by a whole character
                index += rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            }
        }
    }
    if start < source.len() {
        pieces.push(&source[start..]);
    }
    trace!("tokenized {} bytes into {} pieces", source.len(), pieces.len());
    pieces
}

fn match_delimiter(rest: &str, pending: &str) -> Option<&'static str> {
    let delimiter = DELIMITERS.iter().find(|d| rest.starts_with(*d))?;
    // sign of a number exponent, e.g. `1e-3`
    if (*delimiter == "-" || *delimiter == "+") && is_exponent_mantissa(pending) {
        return None;
    }
    Some(delimiter)
}

fn is_exponent_mantissa(pending: &str) -> bool {
    let mut chars = pending.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => (),
        _ => return false,
    }
    if !(pending.ends_with('e') || pending.ends_with('E')) {
        return false;
    }
    pending[..pending.len() - 1]
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.')
}
