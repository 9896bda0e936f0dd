//! Flat list/tuple literal reader for judge replies such as `['Yes', 'No']`.
//!
//! Accepts quoted strings (single or double quotes, backslash escapes),
//! numbers and the bare constants `True`, `False`, `None`. Nesting is not
//! supported; judges are asked for flat lists only.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("expected '[' or '('")]
    NotSequence,

    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },

    #[error("unexpected end of input")]
    UnexpectedEnd,
}

struct Reader<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn string(&mut self, quote: char, start: usize) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err(LiteralError::UnterminatedString { offset: start }),
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, '\\')) => match self.chars.next() {
                    None => return Err(LiteralError::UnterminatedString { offset: start }),
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => out.push(c),
                    Some((_, c)) => {
                        out.push('\\');
                        out.push(c);
                    }
                },
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn bare(&mut self, start: usize) -> &'a str {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '+' | '-') {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        &self.src[start..end]
    }

    fn atom(&mut self) -> Result<String, LiteralError> {
        let &(start, c) = self.chars.peek().ok_or(LiteralError::UnexpectedEnd)?;
        if c == '\'' || c == '"' {
            self.chars.next();
            return self.string(c, start);
        }
        if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' {
            let text = self.bare(start);
            return if text.replace('_', "").parse::<f64>().is_ok() {
                Ok(text.to_string())
            } else {
                Err(LiteralError::InvalidNumber {
                    text: text.to_string(),
                })
            };
        }
        if c.is_alphabetic() {
            let word = self.bare(start);
            return match word {
                "True" | "False" | "None" => Ok(word.to_string()),
                _ => Err(LiteralError::Unexpected { found: c, offset: start }),
            };
        }
        Err(LiteralError::Unexpected { found: c, offset: start })
    }
}

/// Parses a complete `[...]` or `(...)` literal into its item texts.
pub fn parse_sequence(src: &str) -> Result<Vec<String>, LiteralError> {
    let mut r = Reader::new(src.trim());
    let close = match r.chars.next() {
        Some((_, '[')) => ']',
        Some((_, '(')) => ')',
        _ => return Err(LiteralError::NotSequence),
    };

    let mut items = Vec::new();
    loop {
        r.skip_ws();
        match r.chars.peek() {
            None => return Err(LiteralError::UnexpectedEnd),
            Some(&(_, c)) if c == close => {
                r.chars.next();
                break;
            }
            _ => {}
        }

        items.push(r.atom()?);

        r.skip_ws();
        match r.chars.next() {
            Some((_, ',')) => continue,
            Some((_, c)) if c == close => break,
            Some((offset, found)) => return Err(LiteralError::Unexpected { found, offset }),
            None => return Err(LiteralError::UnexpectedEnd),
        }
    }

    r.skip_ws();
    match r.chars.next() {
        None => Ok(items),
        Some((offset, found)) => Err(LiteralError::Unexpected { found, offset }),
    }
}

const QUOTES: [char; 2] = ['\'', '"'];

fn is_quoted(token: &str) -> bool {
    token.len() >= 2
        && QUOTES
            .iter()
            .any(|&q| token.starts_with(q) && token.ends_with(q))
}

/// Rewrites `[Yes, No, 'Could be better']` as `['Yes', 'No', 'Could be better']`:
/// bare non-numeric tokens are quoted, stray brackets and lone quotes are dropped.
/// Returns `None` when nothing is left to quote.
pub fn repair(src: &str) -> Option<String> {
    let src = src.trim();
    let (open, close) = match src.chars().next()? {
        '[' => ('[', ']'),
        '(' => ('(', ')'),
        _ => return None,
    };
    let inner = src.strip_prefix(open)?.strip_suffix(close)?;

    let mut tokens = Vec::new();
    for raw in inner.split(',') {
        let token = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '[' | ']' | '(' | ')') || c.is_whitespace());
        if token.is_empty() {
            continue;
        }
        if is_quoted(token) {
            tokens.push(token.to_string());
            continue;
        }
        let token = token.trim_matches(|c| QUOTES.contains(&c)).trim();
        if token.is_empty() {
            continue;
        }
        if token.parse::<f64>().is_ok() {
            tokens.push(token.to_string());
        } else {
            tokens.push(format!("'{}'", token.replace('\\', "\\\\").replace('\'', "\\'")));
        }
    }

    if tokens.is_empty() {
        return None;
    }
    Some(format!("[{}]", tokens.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_list() {
        assert_eq!(
            parse_sequence(r#"['Yes', "No", 'Could be better']"#).unwrap(),
            vec!["Yes", "No", "Could be better"]
        );
    }

    #[test]
    fn reads_tuple_and_trailing_comma() {
        assert_eq!(parse_sequence("('Yes', 'No',)").unwrap(), vec!["Yes", "No"]);
    }

    #[test]
    fn reads_numbers_and_constants() {
        assert_eq!(parse_sequence("[1, -2.5, None]").unwrap(), vec!["1", "-2.5", "None"]);
    }

    #[test]
    fn empty_list() {
        assert!(parse_sequence("[ ]").unwrap().is_empty());
    }

    #[test]
    fn escapes_in_strings() {
        assert_eq!(parse_sequence(r"['it\'s']").unwrap(), vec!["it's"]);
    }

    #[test]
    fn rejects_bare_words() {
        assert!(matches!(
            parse_sequence("[Yes, No]"),
            Err(LiteralError::Unexpected { found: 'Y', .. })
        ));
    }

    #[test]
    fn rejects_unterminated_and_trailing_text() {
        assert!(matches!(
            parse_sequence("['Yes"),
            Err(LiteralError::UnterminatedString { .. })
        ));
        assert!(parse_sequence("['Yes'] extra").is_err());
        assert_eq!(parse_sequence("['Yes',"), Err(LiteralError::UnexpectedEnd));
    }

    #[test]
    fn repair_quotes_bare_tokens() {
        assert_eq!(
            repair("[Yes, No, Could be better]").unwrap(),
            "['Yes', 'No', 'Could be better']"
        );
        assert_eq!(repair("['Yes', No, 3]").unwrap(), "['Yes', 'No', 3]");
    }

    #[test]
    fn repair_strips_stray_quotes() {
        assert_eq!(repair("[Yes', 'No]").unwrap(), "['Yes', 'No']");
    }

    #[test]
    fn repaired_text_parses() {
        let fixed = repair("[Yes, it's fine]").unwrap();
        assert_eq!(parse_sequence(&fixed).unwrap(), vec!["Yes", "it's fine"]);
    }

    #[test]
    fn repair_gives_up_on_empty_group() {
        assert_eq!(repair("[ , ]"), None);
        assert_eq!(repair("no brackets"), None);
    }
}
