use crate::{
    ast::{Token, TokenType},
    builtins::Builtins,
    error::ParseError,
};

/// Scans a filter expression into a flat token stream.
///
/// A lexer is bound to one source string and consumed by [`Lexer::tokens`],
/// so its scan position can never leak into another compile.
pub struct Lexer<'a> {
    source: &'a str,
    input: Vec<char>,
    position: usize,
    builtins: &'a Builtins,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, builtins: &'a Builtins) -> Self {
        Lexer {
            source,
            input: source.chars().collect(),
            position: 0,
            builtins,
        }
    }

    /// Tokenize the whole source. Either every token is returned or the
    /// first lexical error.
    pub fn tokens(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, message: impl Into<String>, position: usize, len: usize) -> ParseError {
        ParseError::new(message, self.source, position, len)
    }

    /// Whitespace and commas carry no meaning.
    fn skip_insignificant(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || ch == ',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn emit(&mut self, kind: TokenType, len: usize) -> Token {
        let start = self.position;
        let lexeme: String = self.input[start..start + len].iter().collect();
        self.position += len;
        Token::new(kind, start, len, lexeme)
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_insignificant();

        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        let token = match ch {
            '(' => self.emit(TokenType::LeftParen, 1),
            ')' => self.emit(TokenType::RightParen, 1),
            '[' => self.emit(TokenType::LeftBracket, 1),
            ']' => self.emit(TokenType::RightBracket, 1),
            '&' => self.read_boolean_operator('&', TokenType::And, "AND")?,
            '|' => self.read_boolean_operator('|', TokenType::Or, "OR")?,
            '=' => self.emit(TokenType::Equal, 1),
            '@' => self.emit(TokenType::In, 1),
            '>' => {
                if self.peek_char(1) == Some('=') {
                    self.emit(TokenType::GreaterEqual, 2)
                } else {
                    self.emit(TokenType::Greater, 1)
                }
            }
            '<' => {
                if self.peek_char(1) == Some('=') {
                    self.emit(TokenType::LessEqual, 2)
                } else {
                    self.emit(TokenType::Less, 1)
                }
            }
            '~' => self.read_tilde_operator(0),
            '!' => self.read_negated_operator()?,
            '"' | '\'' | '/' => self.read_string(ch)?,
            '-' => self.read_number()?,
            c if c.is_ascii_digit() => self.read_number()?,
            c if c.is_alphabetic() => self.read_identifier()?,
            c => {
                return Err(self.error(
                    format!("Unexpected character '{}'", c),
                    self.position,
                    1,
                ));
            }
        };

        Ok(Some(token))
    }

    fn read_boolean_operator(
        &mut self,
        symbol: char,
        kind: TokenType,
        name: &str,
    ) -> Result<Token, ParseError> {
        if self.peek_char(1) == Some(symbol) {
            return Err(self.error(
                format!(
                    "Invalid boolean operator '{symbol}{symbol}'. Use '{symbol}' for {name}."
                ),
                self.position,
                2,
            ));
        }

        Ok(self.emit(kind, 1))
    }

    /// Greedy match of `~~*`, `~~`, `~*` and `~`. `offset` is the number of
    /// chars in front of the tilde that belong to the operator (the `!`).
    fn read_tilde_operator(&mut self, offset: usize) -> Token {
        let negated = offset > 0;

        let (kind, len) = match (self.peek_char(offset + 1), self.peek_char(offset + 2)) {
            (Some('~'), Some('*')) => (if negated { TokenType::IUnlike } else { TokenType::ILike }, 3),
            (Some('~'), _) => (if negated { TokenType::Unlike } else { TokenType::Like }, 2),
            (Some('*'), _) => (if negated { TokenType::INotRegex } else { TokenType::IRegex }, 2),
            _ => (if negated { TokenType::NotRegex } else { TokenType::Regex }, 1),
        };

        self.emit(kind, len + offset)
    }

    fn read_negated_operator(&mut self) -> Result<Token, ParseError> {
        match self.peek_char(1) {
            Some('=') => Ok(self.emit(TokenType::Unequal, 2)),
            Some('@') => Ok(self.emit(TokenType::NotIn, 2)),
            Some('~') => Ok(self.read_tilde_operator(1)),
            _ => Err(self.error(
                "Invalid operator '!'. Use '!=', '!@', '!~', '!~*', '!~~' or '!~~*'.",
                self.position,
                1,
            )),
        }
    }

    /// Strings are delimited by `"`, `'` or `/`. Only the delimiter itself
    /// can be escaped; every other backslash is kept as is.
    fn read_string(&mut self, delimiter: char) -> Result<Token, ParseError> {
        let start = self.position;
        let mut value = String::new();
        self.advance();

        loop {
            match self.current_char() {
                None => {
                    return Err(self.error(
                        "Unterminated string",
                        start,
                        self.position - start,
                    ));
                }
                Some('\\') if self.peek_char(1) == Some(delimiter) => {
                    value.push(delimiter);
                    self.advance();
                    self.advance();
                }
                Some(ch) if ch == delimiter => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Token::new(
            TokenType::String,
            start,
            self.position - start,
            value,
        ))
    }

    fn read_digits(&mut self, number: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();

            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("Invalid number: expected a digit after '-'", start, 1));
            }
        }

        self.read_digits(&mut number);

        if self.current_char() == Some('.') {
            if !self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error(
                    "Invalid number: expected a digit after the decimal point",
                    start,
                    self.position - start + 1,
                ));
            }

            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        Ok(Token::new(
            TokenType::Number,
            start,
            self.position - start,
            number,
        ))
    }

    fn read_identifier(&mut self) -> Result<Token, ParseError> {
        let start = self.position;
        let mut ident = String::new();

        while let Some(ch) = self.current_char() {
            match ch {
                c if c.is_alphanumeric() || c == '_' || c == '-' => {
                    ident.push(c);
                    self.advance();
                }
                '.' => {
                    match self.peek_char(1) {
                        Some('.') => {
                            return Err(self.error(
                                "Invalid field name: double dot",
                                self.position,
                                2,
                            ));
                        }
                        Some(c) if c.is_alphanumeric() || c == '_' || c == '*' || c == '?' => {}
                        _ => {
                            return Err(self.error(
                                "Invalid field name: a dot must be followed by a name or a wildcard",
                                start,
                                self.position - start + 1,
                            ));
                        }
                    }

                    ident.push('.');
                    self.advance();
                }
                '*' | '?' => {
                    if !ident.ends_with('.') {
                        return Err(self.error(
                            "Invalid field name: wildcards are only allowed directly after a dot",
                            self.position,
                            1,
                        ));
                    }

                    ident.push(ch);
                    self.advance();

                    if self
                        .current_char()
                        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '*' | '?'))
                    {
                        return Err(self.error(
                            "Invalid field name: a wildcard must be the last segment",
                            start,
                            self.position - start + 1,
                        ));
                    }
                }
                _ => break,
            }
        }

        let kind = self.classify(&ident);

        Ok(Token::new(kind, start, self.position - start, ident))
    }

    fn classify(&self, ident: &str) -> TokenType {
        match ident {
            "true" | "false" => TokenType::Boolean,
            "null" => TokenType::Null,
            "now" => TokenType::Keyword,
            _ if has_prefix_segment(ident, "path") => TokenType::Path,
            _ if has_prefix_segment(ident, "fulltext") => TokenType::Fulltext,
            _ if self.builtins.contains(ident) => TokenType::Builtin,
            _ => TokenType::Field,
        }
    }
}

/// `ident` equals `prefix` or starts with `prefix.`.
fn has_prefix_segment(ident: &str, prefix: &str) -> bool {
    ident
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

#[test]
fn test_keywords() {
    let builtins = Builtins::new();
    let tokens = Lexer::new("true false null now", &builtins).tokens().unwrap();
    let kinds: Vec<TokenType> = tokens.iter().map(|t| t.kind).collect();

    assert_eq!(
        kinds,
        vec![
            TokenType::Boolean,
            TokenType::Boolean,
            TokenType::Null,
            TokenType::Keyword
        ]
    );
}

#[test]
fn test_comparison() {
    let builtins = Builtins::new();
    let tokens = Lexer::new("(rating >= 5)", &builtins).tokens().unwrap();

    assert_eq!(tokens.len(), 5);
    assert_eq!(tokens[0].kind, TokenType::LeftParen);
    assert_eq!(tokens[1].kind, TokenType::Field);
    assert_eq!(tokens[1].lexeme, "rating");
    assert_eq!(tokens[2].kind, TokenType::GreaterEqual);
    assert_eq!(tokens[3].kind, TokenType::Number);
    assert_eq!(tokens[3].lexeme, "5");
    assert_eq!(tokens[4].kind, TokenType::RightParen);
}
