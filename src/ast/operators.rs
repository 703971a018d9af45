use super::TokenType;

/// The rendering families comparison operators fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// `=`, `!=`, `>`, `>=`, `<`, `<=`
    Comparison,
    /// `~~`, `~~*`, `!~~`, `!~~*`
    Like,
    /// `~`, `~*`, `!~`, `!~*`
    Regex,
    /// `@`, `!@`
    Set,
}

impl TokenType {
    /// Classify a comparison operator. `None` for every other token type.
    pub fn operator_class(self) -> Option<OperatorClass> {
        use TokenType::*;

        match self {
            Equal | Unequal | Greater | GreaterEqual | Less | LessEqual => {
                Some(OperatorClass::Comparison)
            }
            Like | ILike | Unlike | IUnlike => Some(OperatorClass::Like),
            Regex | IRegex | NotRegex | INotRegex => Some(OperatorClass::Regex),
            In | NotIn => Some(OperatorClass::Set),
            _ => None,
        }
    }

    /// True for the negated like, regex and set operators.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            TokenType::Unlike
                | TokenType::IUnlike
                | TokenType::NotRegex
                | TokenType::INotRegex
                | TokenType::NotIn
        )
    }

    /// True for the case insensitive like and regex operators.
    pub fn is_case_insensitive(self) -> bool {
        matches!(
            self,
            TokenType::ILike | TokenType::IUnlike | TokenType::IRegex | TokenType::INotRegex
        )
    }

    /// SQL spelling of a plain comparison operator.
    pub fn sql_comparison(self) -> Option<&'static str> {
        match self {
            TokenType::Equal => Some("="),
            TokenType::Unequal => Some("!="),
            TokenType::Greater => Some(">"),
            TokenType::GreaterEqual => Some(">="),
            TokenType::Less => Some("<"),
            TokenType::LessEqual => Some("<="),
            _ => None,
        }
    }

    /// JSONPath spelling of a plain comparison operator.
    pub fn jsonpath_comparison(self) -> Option<&'static str> {
        match self {
            TokenType::Equal => Some("=="),
            other => other.sql_comparison(),
        }
    }

    /// The operator with its operands swapped: `a < b` is `b > a`.
    pub fn mirrored(self) -> TokenType {
        match self {
            TokenType::Greater => TokenType::Less,
            TokenType::GreaterEqual => TokenType::LessEqual,
            TokenType::Less => TokenType::Greater,
            TokenType::LessEqual => TokenType::GreaterEqual,
            other => other,
        }
    }

    /// How the operator is written in the query language, for messages.
    pub fn symbol(self) -> &'static str {
        use TokenType::*;

        match self {
            Equal => "=",
            Unequal => "!=",
            Greater => ">",
            GreaterEqual => ">=",
            Less => "<",
            LessEqual => "<=",
            Like => "~~",
            ILike => "~~*",
            Unlike => "!~~",
            IUnlike => "!~~*",
            Regex => "~",
            IRegex => "~*",
            NotRegex => "!~",
            INotRegex => "!~*",
            In => "@",
            NotIn => "!@",
            And => "&",
            Or => "|",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            String => "string",
            Number => "number",
            Boolean => "boolean",
            Null => "null",
            Field => "field",
            Builtin => "builtin",
            Path => "path",
            Fulltext => "fulltext",
            Keyword => "keyword",
            List => "list",
        }
    }
}
