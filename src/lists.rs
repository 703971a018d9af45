//! Folds bracketed token runs into single list operands.
//!
//! ```text
//! category @ [ 'news' 'blog' ]   ->   Field In List('news', 'blog')
//! ```
//!
//! Runs once between lexing and parsing; the parser never sees brackets.

use crate::{
    ast::{Token, TokenGroup, TokenType},
    error::ParseError,
};

pub fn materialize_lists(tokens: Vec<Token>, source: &str) -> Result<Vec<Token>, ParseError> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut open: Option<(Token, Vec<Token>)> = None;

    for token in tokens {
        match token.group {
            TokenGroup::LeftBracket => {
                if open.is_some() {
                    return Err(ParseError::at_token(
                        "Nested lists are not allowed",
                        source,
                        &token,
                    ));
                }

                open = Some((token, Vec::new()));
            }
            TokenGroup::RightBracket => {
                let Some((start, items)) = open.take() else {
                    return Err(ParseError::at_token(
                        "Unbalanced brackets: ']' without matching '['",
                        source,
                        &token,
                    ));
                };

                if items.is_empty() {
                    return Err(ParseError::new(
                        "Empty lists are not allowed",
                        source,
                        start.position,
                        token.end() - start.position,
                    ));
                }

                let len = token.end() - start.position;
                let lexeme: String = source.chars().skip(start.position).take(len).collect();
                result.push(Token::list(start.position, len, lexeme, items));
            }
            _ => match open.as_mut() {
                Some((_, items)) => {
                    if token.group != TokenGroup::Operand {
                        return Err(ParseError::at_token(
                            "Only values are allowed inside lists",
                            source,
                            &token,
                        ));
                    }

                    if !token.kind.is_scalar() {
                        return Err(ParseError::at_token(
                            "Lists may only contain strings, numbers and booleans",
                            source,
                            &token,
                        ));
                    }

                    items.push(token);
                }
                None => result.push(token),
            },
        }
    }

    if let Some((start, _)) = open {
        return Err(ParseError::at_token(
            "Unbalanced brackets: '[' is never closed",
            source,
            &start,
        ));
    }

    debug_assert!(result.iter().all(|t| !matches!(
        t.kind,
        TokenType::LeftBracket | TokenType::RightBracket
    )));

    Ok(result)
}
