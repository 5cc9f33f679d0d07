//! A small S-expression reader for KiCad's new-format files.
//!
//! Atoms keep their exact source text; whether an atom is a number is decided
//! lazily by the accessors, so callers can reproduce integer-vs-float
//! distinctions from the input.

use std::fmt;

/// An S-expression value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sexpr {
    /// An unquoted atom
    Symbol(String),
    /// A quoted atom
    String(String),
    /// A parenthesized list
    List(Vec<Sexpr>),
}

impl Sexpr {
    pub fn symbol(s: impl Into<String>) -> Self {
        Sexpr::Symbol(s.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Sexpr::String(s.into())
    }

    pub fn list(items: Vec<Sexpr>) -> Self {
        Sexpr::List(items)
    }

    /// Atom text, quoted or not
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Sexpr::Symbol(s) | Sexpr::String(s) => Some(s),
            Sexpr::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Sexpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Atom text parsed as a float
    pub fn as_f64(&self) -> Option<f64> {
        self.as_atom()?.parse().ok()
    }

    /// Atom text parsed as an integer
    pub fn as_i64(&self) -> Option<i64> {
        self.as_atom()?.parse().ok()
    }

    /// Head keyword of a keyword-led list, e.g. `at` for `(at 1 2 90)`
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }

    /// List items after the head keyword; empty for atoms
    pub fn body(&self) -> &[Sexpr] {
        match self.as_list() {
            Some([_, rest @ ..]) => rest,
            _ => &[],
        }
    }

    /// Nth item after the head keyword
    pub fn arg(&self, n: usize) -> Option<&Sexpr> {
        self.body().get(n)
    }

    /// First child list with the given head keyword
    pub fn child(&self, keyword: &str) -> Option<&Sexpr> {
        self.body().iter().find(|e| e.head() == Some(keyword))
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexpr::Symbol(s) => write!(f, "{s}"),
            Sexpr::String(s) => write!(f, "\"{s}\""),
            Sexpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Errors that can occur while reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    UnexpectedEof,
    UnexpectedChar(char),
    UnclosedList,
    UnterminatedString,
    TrailingInput(usize),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::UnexpectedEof => write!(f, "unexpected end of input"),
            ReadError::UnexpectedChar(ch) => write!(f, "unexpected character '{ch}'"),
            ReadError::UnclosedList => write!(f, "unclosed list"),
            ReadError::UnterminatedString => write!(f, "unterminated string"),
            ReadError::TrailingInput(pos) => write!(f, "trailing input at byte {pos}"),
        }
    }
}

impl std::error::Error for ReadError {}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Reader { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_value(&mut self) -> Result<Sexpr, ReadError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ReadError::UnexpectedEof),
            Some('(') => self.read_list(),
            Some(')') => Err(ReadError::UnexpectedChar(')')),
            Some('"') => self.read_string(),
            Some(_) => self.read_bare(),
        }
    }

    fn read_list(&mut self) -> Result<Sexpr, ReadError> {
        self.bump(); // consume '('
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ReadError::UnclosedList),
                Some(')') => {
                    self.bump();
                    if items.len() % 4096 == 0 && !items.is_empty() {
                        log::trace!("read list of {} items", items.len());
                    }
                    return Ok(Sexpr::List(items));
                }
                Some(_) => items.push(self.read_value()?),
            }
        }
    }

    fn read_string(&mut self) -> Result<Sexpr, ReadError> {
        self.bump(); // consume opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(ReadError::UnterminatedString),
                Some('"') => return Ok(Sexpr::String(text)),
                Some('\\') => match self.bump() {
                    None => return Err(ReadError::UnterminatedString),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some(ch) => text.push(ch),
                },
                Some(ch) => text.push(ch),
            }
        }
    }

    fn read_bare(&mut self) -> Result<Sexpr, ReadError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            self.bump();
        }
        Ok(Sexpr::Symbol(self.src[start..self.pos].to_string()))
    }
}

/// Read a single S-expression from the input.
///
/// Anything but trailing whitespace after the expression is an error.
pub fn parse(input: &str) -> Result<Sexpr, ReadError> {
    log::trace!("reading S-expression from {} bytes", input.len());
    let mut reader = Reader::new(input);
    let value = reader.read_value()?;
    reader.skip_whitespace();
    if reader.pos < input.len() {
        return Err(ReadError::TrailingInput(reader.pos));
    }
    Ok(value)
}
