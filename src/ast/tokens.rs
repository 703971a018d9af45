/// Coarse token classification used by the parser's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenGroup {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    /// Anything that can stand on either side of a comparison
    Operand,
    /// Comparison operators
    Operator,
    /// `&` and `|`
    BooleanOperator,
}

/// Fine grained token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Comparison operators
    /// Equality
    ///
    /// # Examples
    /// ```text
    /// category = 'news'
    /// ```
    Equal,

    /// Inequality
    ///
    /// # Examples
    /// ```text
    /// category != 'news'
    /// ```
    Unequal,

    /// Greater than (`>`)
    Greater,

    /// Greater than or equal (`>=`)
    GreaterEqual,

    /// Less than (`<`)
    Less,

    /// Less than or equal (`<=`)
    LessEqual,

    /// Case sensitive SQL `LIKE`
    ///
    /// # Examples
    /// ```text
    /// title ~~ '%rust%'
    /// ```
    Like,

    /// Case insensitive SQL `LIKE` (`~~*`)
    ILike,

    /// Negated `LIKE` (`!~~`)
    Unlike,

    /// Negated case insensitive `LIKE` (`!~~*`)
    IUnlike,

    /// Regular expression match
    ///
    /// # Examples
    /// ```text
    /// title ~ /^Rust [0-9]+$/
    /// ```
    Regex,

    /// Case insensitive regular expression match (`~*`)
    IRegex,

    /// Negated regular expression match (`!~`)
    NotRegex,

    /// Negated case insensitive regular expression match (`!~*`)
    INotRegex,

    /// Membership in a list
    ///
    /// # Examples
    /// ```text
    /// category @ ['news', 'blog']
    /// ```
    In,

    /// Non-membership in a list (`!@`)
    NotIn,

    // Boolean connectors
    /// `&`
    And,

    /// `|`
    Or,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // Operands
    /// String literal delimited by `"`, `'` or `/`
    String,

    /// Integer or decimal literal with optional leading minus
    Number,

    /// `true` or `false`
    Boolean,

    /// `null`
    Null,

    /// JSON content field, optionally followed by locale or wildcard segments
    ///
    /// # Examples
    /// ```text
    /// title
    /// title.de
    /// title.*
    /// ```
    Field,

    /// Identifier resolving to a SQL column expression
    Builtin,

    /// The node's URL path, optionally restricted to a locale
    ///
    /// # Examples
    /// ```text
    /// path
    /// path.de
    /// ```
    Path,

    /// Full text search identifier
    Fulltext,

    /// Fixed keyword, currently only `now`
    Keyword,

    /// Bracketed list of scalar values, produced by list materialization
    List,
}

impl TokenType {
    pub fn group(self) -> TokenGroup {
        use TokenType::*;

        match self {
            Equal | Unequal | Greater | GreaterEqual | Less | LessEqual | Like | ILike
            | Unlike | IUnlike | Regex | IRegex | NotRegex | INotRegex | In | NotIn => {
                TokenGroup::Operator
            }
            And | Or => TokenGroup::BooleanOperator,
            LeftParen => TokenGroup::LeftParen,
            RightParen => TokenGroup::RightParen,
            LeftBracket => TokenGroup::LeftBracket,
            RightBracket => TokenGroup::RightBracket,
            String | Number | Boolean | Null | Field | Builtin | Path | Fulltext | Keyword
            | List => TokenGroup::Operand,
        }
    }

    /// Scalar literals are the only values allowed inside lists.
    pub fn is_scalar(self) -> bool {
        matches!(self, TokenType::String | TokenType::Number | TokenType::Boolean)
    }
}

/// A lexical token.
///
/// `position` and `len` describe the token's span in the source in chars.
/// `lexeme` is the represented text: for strings the content without
/// delimiters and with escaped delimiters resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub group: TokenGroup,
    pub kind: TokenType,
    pub position: usize,
    pub len: usize,
    pub lexeme: String,
    /// Elements of a [`TokenType::List`] token, empty for everything else
    pub items: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenType, position: usize, len: usize, lexeme: impl Into<String>) -> Self {
        Token {
            group: kind.group(),
            kind,
            position,
            len,
            lexeme: lexeme.into(),
            items: Vec::new(),
        }
    }

    pub fn list(position: usize, len: usize, lexeme: impl Into<String>, items: Vec<Token>) -> Self {
        Token {
            items,
            ..Token::new(TokenType::List, position, len, lexeme)
        }
    }

    pub fn is(&self, kind: TokenType) -> bool {
        self.kind == kind
    }

    /// Char offset one past the end of the token in the source.
    pub fn end(&self) -> usize {
        self.position + self.len
    }
}
