//! Turns lexemes into typed tokens.

use fnv::FnvHashSet;

use crate::types::{Ending, Number, Position, Text, Token, Trivia, Value, NAMESPACES};

use super::coalesce::{Lexeme, LexemeKind};

/// Preprocessor directives recognized as such.
pub static PREPROCESSORS: &[&str] = &[
    "#define", "#include", "#undef", "#ifdef", "#ifndef", "#else", "#endif", "#if",
];

/// Keywords the parser needs regardless of the expression database.
pub static PARSER_KEYWORDS: &[&str] = &["=", "private"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket {
    Parenthesis,
    Square,
    Brace,
}

impl Bracket {
    pub fn open(&self) -> char {
        match self {
            Bracket::Parenthesis => '(',
            Bracket::Square => '[',
            Bracket::Brace => '{',
        }
    }
}

/// Classified element of the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Open(Bracket, Position),
    Close(Bracket, Position),
    Separator(Ending, Position),
    Token(Token),
}

/// Classifies every lexeme. `keywords` holds lower-cased keyword names.
pub fn classify(lexemes: Vec<Lexeme>, keywords: &FnvHashSet<String>) -> Vec<Item> {
    lexemes
        .into_iter()
        .map(|lexeme| {
            let position = lexeme.position;
            match lexeme.kind {
                LexemeKind::Comment => Item::Token(Token::new(
                    Value::Trivia(Trivia::Comment(lexeme.text.into_owned())),
                    position,
                )),
                LexemeKind::String => Item::Token(Token::new(
                    Value::String(Text::from_literal(&lexeme.text)),
                    position,
                )),
                LexemeKind::Piece => classify_piece(&lexeme.text, position, keywords),
            }
        })
        .collect()
}

fn classify_piece(text: &str, position: Position, keywords: &FnvHashSet<String>) -> Item {
    let value = match text {
        "(" => return Item::Open(Bracket::Parenthesis, position),
        "[" => return Item::Open(Bracket::Square, position),
        "{" => return Item::Open(Bracket::Brace, position),
        ")" => return Item::Close(Bracket::Parenthesis, position),
        "]" => return Item::Close(Bracket::Square, position),
        "}" => return Item::Close(Bracket::Brace, position),
        ";" => return Item::Separator(Ending::Semicolon, position),
        "," => return Item::Separator(Ending::Comma, position),
        " " => Value::Trivia(Trivia::Space),
        "\t" => Value::Trivia(Trivia::Tab),
        "\\\n" => Value::Trivia(Trivia::BrokenEndOfLine(false)),
        "\\\r\n" => Value::Trivia(Trivia::BrokenEndOfLine(true)),
        "\n" => Value::Trivia(Trivia::EndOfLine(false)),
        "\r\n" => Value::Trivia(Trivia::EndOfLine(true)),
        "true" => Value::Boolean(Some(true)),
        "false" => Value::Boolean(Some(false)),
        _ => {
            if let Some(number) = parse_number(text) {
                Value::Number(Some(number))
            } else if PREPROCESSORS.contains(&text) {
                Value::Preprocessor(text.to_string())
            } else {
                let lower = text.to_lowercase();
                if NAMESPACES.contains(&lower.as_str()) {
                    Value::Namespace(Some(text.to_string()))
                } else if keywords.contains(&lower) || PARSER_KEYWORDS.contains(&lower.as_str()) {
                    Value::Keyword(text.to_string())
                } else {
                    Value::Variable(text.to_string())
                }
            }
        }
    };
    Item::Token(Token::new(value, position))
}

/// Integer first, then decimal, then hexadecimal.
fn parse_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::int(int).with_literal(text));
    }
    let first = text.chars().next()?;
    if first.is_ascii_digit() || first == '.' {
        if let Ok(float) = text.parse::<f64>() {
            return Some(Number::float(float).with_literal(text));
        }
    }
    if text.len() > 2 && (text.starts_with("0x") || text.starts_with("0X")) {
        if let Ok(int) = i64::from_str_radix(&text[2..], 16) {
            return Some(Number::int(int).with_literal(text));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{coalesce::coalesce, lexer::tokenize};

    fn values(source: &str) -> Vec<Item> {
        let mut keywords = FnvHashSet::default();
        keywords.insert("hint".to_string());
        keywords.insert("==".to_string());
        classify(coalesce(&tokenize(source)).unwrap(), &keywords)
    }

    fn value(item: &Item) -> &Value {
        match item {
            Item::Token(token) => &token.value,
            _ => panic!("not a token: {:?}", item),
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(Some(1.0), value(&values("1")[0]).as_number());
        assert_eq!(Some(0.5), value(&values(".5")[0]).as_number());
        assert_eq!(Some(255.0), value(&values("0xFF")[0]).as_number());
        assert_eq!(Some(0.001), value(&values("1e-3")[0]).as_number());
        assert_eq!("1e-3", value(&values("1e-3")[0]).to_string());
        assert_eq!(&Value::Variable("nan".to_string()), value(&values("nan")[0]));
    }

    #[test]
    fn words() {
        let items = values("HINT _x == missionNamespace #define true");
        assert_eq!(&Value::keyword("hint"), value(&items[0]));
        assert_eq!(&Value::Variable("_x".to_string()), value(&items[2]));
        assert_eq!(&Value::keyword("=="), value(&items[4]));
        assert_eq!(
            &Value::Namespace(Some("missionnamespace".to_string())),
            value(&items[6])
        );
        assert_eq!(&Value::Preprocessor("#define".to_string()), value(&items[8]));
        assert_eq!(&Value::Boolean(Some(true)), value(&items[10]));
    }

    #[test]
    fn punctuation() {
        let items = values("(\n[;");
        assert_eq!(Item::Open(Bracket::Parenthesis, Position::new(1, 1)), items[0]);
        assert_eq!(&Value::Trivia(Trivia::EndOfLine(false)), value(&items[1]));
        assert_eq!(Item::Open(Bracket::Square, Position::new(2, 1)), items[2]);
        assert_eq!(Item::Separator(Ending::Semicolon, Position::new(2, 2)), items[3]);
    }
}
