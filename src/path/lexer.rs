/// SQL/JSON path expression tokenizer.
use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Dollar,   // $ (bare root)
    At,       // @
    Dot,      // .
    LBrack,   // [
    RBrack,   // ]
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    Comma,    // ,
    Question, // ?
    Star,     // *
    StarStar, // **
    Bang,     // !
    // Comparison operators
    Eq, // ==
    Ne, // != or <>
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
    // Boolean operators
    AndAnd, // &&
    OrOr,   // ||
    // Arithmetic
    Plus,    // +
    Minus,   // -
    Slash,   // /
    Percent, // %
    // Literals and identifiers
    Ident(String),
    Var(String), // $name or $"name"
    Str(String),
    Int(i64),
    Numeric(String), // non-integer number literal, source text preserved
    // Keywords
    Lax,
    Strict,
    True,
    False,
    Null,
    To,
    Last,
    Exists,
    Is,
    Unknown,
    Starts,
    With,
    LikeRegex,
    Flag,
}

pub fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Two-char operators first
        if i + 1 < bytes.len() {
            let two = match (bytes[i], bytes[i + 1]) {
                (b'=', b'=') => Some(Token::Eq),
                (b'!', b'=') => Some(Token::Ne),
                (b'<', b'>') => Some(Token::Ne),
                (b'<', b'=') => Some(Token::Le),
                (b'>', b'=') => Some(Token::Ge),
                (b'&', b'&') => Some(Token::AndAnd),
                (b'|', b'|') => Some(Token::OrOr),
                (b'*', b'*') => Some(Token::StarStar),
                _ => None,
            };
            if let Some(tok) = two {
                tokens.push(tok);
                i += 2;
                continue;
            }
        }

        match bytes[i] {
            b'.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            b'[' => {
                tokens.push(Token::LBrack);
                i += 1;
            }
            b']' => {
                tokens.push(Token::RBrack);
                i += 1;
            }
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b'{' => {
                tokens.push(Token::LBrace);
                i += 1;
            }
            b'}' => {
                tokens.push(Token::RBrace);
                i += 1;
            }
            b',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            b'?' => {
                tokens.push(Token::Question);
                i += 1;
            }
            b'*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            b'!' => {
                tokens.push(Token::Bang);
                i += 1;
            }
            b'<' => {
                tokens.push(Token::Lt);
                i += 1;
            }
            b'>' => {
                tokens.push(Token::Gt);
                i += 1;
            }
            b'+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            b'/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            b'%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            b'=' => bail!("unexpected '=' (use '==') at offset {i}"),
            b'&' => bail!("unexpected '&' (use '&&') at offset {i}"),
            b'|' => bail!("unexpected '|' (use '||') at offset {i}"),
            b'$' => {
                // $name, $"name", or bare $
                if i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) {
                    let start = i + 1;
                    let mut end = start;
                    while end < bytes.len() && is_ident_char(bytes[end]) {
                        end += 1;
                    }
                    tokens.push(Token::Var(input[start..end].to_string()));
                    i = end;
                } else if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                    let (s, consumed) = lex_string(input, i + 1)?;
                    tokens.push(Token::Var(s));
                    i = i + 1 + consumed;
                } else {
                    tokens.push(Token::Dollar);
                    i += 1;
                }
            }
            b'@' => {
                tokens.push(Token::At);
                i += 1;
            }
            b'"' => {
                let (s, consumed) = lex_string(input, i)?;
                tokens.push(Token::Str(s));
                i += consumed;
            }
            b'0'..=b'9' => {
                let (tok, consumed) = lex_number(input, i)?;
                tokens.push(tok);
                i += consumed;
            }
            b if is_ident_start(b) => {
                let start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                tokens.push(keyword_or_ident(&input[start..i]));
            }
            b => bail!("unexpected character {:?} at offset {i}", b as char),
        }
    }

    Ok(tokens)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn keyword_or_ident(word: &str) -> Token {
    match word {
        "lax" => Token::Lax,
        "strict" => Token::Strict,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        "to" => Token::To,
        "last" => Token::Last,
        "exists" => Token::Exists,
        "is" => Token::Is,
        "unknown" => Token::Unknown,
        "starts" => Token::Starts,
        "with" => Token::With,
        "like_regex" => Token::LikeRegex,
        "flag" => Token::Flag,
        _ => Token::Ident(word.to_string()),
    }
}

/// Lex a number starting at `start`. Integer literals in i64 range become
/// `Int`; anything with a fraction or exponent (or too large) keeps its
/// source text as `Numeric`.
fn lex_number(input: &str, start: usize) -> Result<(Token, usize)> {
    let bytes = input.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut is_integer = true;
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        is_integer = false;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            is_integer = false;
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    let text = &input[start..i];
    let tok = if is_integer {
        match text.parse::<i64>() {
            Ok(n) => Token::Int(n),
            Err(_) => Token::Numeric(text.to_string()),
        }
    } else {
        // Validate now so evaluation never sees an unparsable literal
        if text.parse::<f64>().is_err() {
            bail!("invalid numeric literal {text:?}");
        }
        Token::Numeric(text.to_string())
    };
    Ok((tok, i - start))
}

/// Lex a double-quoted string starting at `start` (which must point at the
/// opening quote). Returns the unescaped contents and bytes consumed
/// including both quotes.
fn lex_string(input: &str, start: usize) -> Result<(String, usize)> {
    let bytes = input.as_bytes();
    let mut i = start + 1;
    let mut out = String::new();
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Ok((out, i + 1 - start)),
            b'\\' => {
                i += 1;
                let Some(&esc) = bytes.get(i) else {
                    bail!("unterminated escape in string literal");
                };
                match esc {
                    b'"' => out.push('"'),
                    b'\\' => out.push('\\'),
                    b'/' => out.push('/'),
                    b'b' => out.push('\u{0008}'),
                    b'f' => out.push('\u{000c}'),
                    b'n' => out.push('\n'),
                    b'r' => out.push('\r'),
                    b't' => out.push('\t'),
                    b'u' => {
                        let (c, consumed) = lex_unicode_escape(input, i + 1)?;
                        out.push(c);
                        i += consumed;
                    }
                    _ => bail!("unknown escape '\\{}' in string literal", esc as char),
                }
                i += 1;
            }
            _ => {
                // Copy one whole UTF-8 character
                let c = input[i..].chars().next().unwrap_or('\u{fffd}');
                out.push(c);
                i += c.len_utf8();
            }
        }
    }
    bail!("unterminated string literal")
}

/// Parse the `XXXX` of a `\uXXXX` escape at `pos`, combining surrogate
/// pairs. Returns the decoded char and extra bytes consumed beyond the
/// initial `u`.
fn lex_unicode_escape(input: &str, pos: usize) -> Result<(char, usize)> {
    let hex4 = |at: usize| -> Result<u32> {
        let Some(h) = input.get(at..at + 4) else {
            bail!("truncated \\u escape");
        };
        u32::from_str_radix(h, 16).map_err(|_| anyhow::anyhow!("invalid \\u escape {h:?}"))
    };
    let first = hex4(pos)?;
    if (0xD800..0xDC00).contains(&first) {
        // High surrogate: require \uXXXX low surrogate
        if input.get(pos + 4..pos + 6) != Some("\\u") {
            bail!("unpaired surrogate in \\u escape");
        }
        let second = hex4(pos + 6)?;
        if !(0xDC00..0xE000).contains(&second) {
            bail!("unpaired surrogate in \\u escape");
        }
        let c = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        match char::from_u32(c) {
            Some(c) => Ok((c, 10)),
            None => bail!("invalid \\u escape"),
        }
    } else {
        match char::from_u32(first) {
            Some(c) => Ok((c, 4)),
            None => bail!("invalid \\u escape"),
        }
    }
}
