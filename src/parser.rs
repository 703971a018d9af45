use tracing::trace;

use crate::{
    ast::{Token, TokenGroup},
    error::{OutputError, ParseError},
    output::{Context, OutputNode},
};

/// Turns a materialized token stream into output nodes.
///
/// The scan is linear. It tracks whether the next thing must be a
/// condition (start of input, after `&`, `|` or `(`) and the parenthesis
/// balance, and requires both to be settled at the end.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    ctx: Context<'a>,
    position: usize,
    ready_for_condition: bool,
    open_parens: Vec<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>, ctx: Context<'a>) -> Self {
        Parser {
            source,
            tokens,
            ctx,
            position: 0,
            ready_for_condition: true,
            open_parens: Vec::new(),
        }
    }

    fn error(&self, message: impl Into<String>, token: &Token) -> ParseError {
        ParseError::at_token(message, self.source, token)
    }

    fn output_error(&self, err: OutputError) -> ParseError {
        err.into_parse_error(self.source)
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    fn previous(&self) -> Option<&Token> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
    }

    pub fn parse(mut self) -> Result<Vec<OutputNode>, ParseError> {
        let mut nodes = Vec::new();

        if self.tokens.is_empty() {
            return Err(ParseError::at_end("Empty filter expression", self.source));
        }

        while let Some(group) = self.peek(0).map(|t| t.group) {
            let node = match group {
                TokenGroup::Operand => self.parse_condition()?,
                TokenGroup::BooleanOperator => self.parse_boolean_operator()?,
                TokenGroup::LeftParen => self.parse_left_paren()?,
                TokenGroup::RightParen => self.parse_right_paren()?,
                TokenGroup::Operator => {
                    let token = &self.tokens[self.position];
                    return Err(self.error("Operator without a left hand operand", token));
                }
                TokenGroup::LeftBracket | TokenGroup::RightBracket => {
                    let token = &self.tokens[self.position];
                    return Err(self.error("Unexpected bracket", token));
                }
            };

            trace!(?node, "parsed output node");
            nodes.push(node);
        }

        if let Some(&open) = self.open_parens.last() {
            return Err(ParseError::new(
                "Unbalanced parenthesis: '(' is never closed",
                self.source,
                open,
                1,
            ));
        }

        if self.ready_for_condition {
            return Err(ParseError::at_end("Incomplete expression", self.source));
        }

        Ok(nodes)
    }

    fn parse_condition(&mut self) -> Result<OutputNode, ParseError> {
        let left = &self.tokens[self.position];

        if !self.ready_for_condition {
            return Err(self.error(
                "Missing boolean operator between conditions. Use '&' or '|'.",
                left,
            ));
        }

        let next = self.peek(1);
        let after_next = self.peek(2);

        let (node, consumed) = match (next.map(|t| t.group), after_next.map(|t| t.group)) {
            (Some(TokenGroup::Operator), Some(TokenGroup::Operand)) => {
                let operator = &self.tokens[self.position + 1];
                let right = &self.tokens[self.position + 2];
                let node = OutputNode::condition(left, operator, right, self.ctx)
                    .map_err(|e| self.output_error(e))?;
                (node, 3)
            }
            (None | Some(TokenGroup::BooleanOperator) | Some(TokenGroup::RightParen), _) => {
                let node = OutputNode::exists(left, self.ctx).map_err(|e| self.output_error(e))?;
                (node, 1)
            }
            (Some(TokenGroup::Operator), Some(TokenGroup::Operator)) => {
                let first = &self.tokens[self.position + 1];
                let second = &self.tokens[self.position + 2];
                return Err(ParseError::new(
                    "Multiple operators. Use a single operator, e.g. '=' instead of '=='.",
                    self.source,
                    first.position,
                    second.end() - first.position,
                ));
            }
            (Some(TokenGroup::Operator), _) => {
                let operator = &self.tokens[self.position + 1];
                return Err(self.error("Missing value after operator", operator));
            }
            (Some(TokenGroup::Operand), _) => {
                let operand = &self.tokens[self.position + 1];
                return Err(self.error("Missing operator between operands", operand));
            }
            (Some(_), _) => {
                let token = &self.tokens[self.position + 1];
                return Err(self.error("Invalid syntax", token));
            }
        };

        self.position += consumed;
        self.ready_for_condition = false;

        Ok(node)
    }

    fn parse_boolean_operator(&mut self) -> Result<OutputNode, ParseError> {
        let token = &self.tokens[self.position];

        if self.ready_for_condition {
            return Err(self.error("Invalid position for a boolean operator", token));
        }

        if self.position + 1 == self.tokens.len() {
            return Err(self.error("Boolean operator at the end of the expression.", token));
        }

        let node = OutputNode::connector(token);
        self.ready_for_condition = true;
        self.position += 1;

        Ok(node)
    }

    fn parse_left_paren(&mut self) -> Result<OutputNode, ParseError> {
        let token = &self.tokens[self.position];

        if !self.ready_for_condition {
            return Err(self.error(
                "Missing boolean operator before parenthesis. Use '&' or '|'.",
                token,
            ));
        }

        self.open_parens.push(token.position);
        self.position += 1;

        Ok(OutputNode::LeftParen)
    }

    fn parse_right_paren(&mut self) -> Result<OutputNode, ParseError> {
        let token = &self.tokens[self.position];

        if self
            .previous()
            .is_some_and(|prev| prev.group == TokenGroup::LeftParen)
        {
            return Err(self.error("Empty parenthesis", token));
        }

        if self.open_parens.is_empty() {
            return Err(self.error("Unbalanced parenthesis: ')' without matching '('", token));
        }

        if self.ready_for_condition {
            return Err(self.error("Incomplete expression before ')'", token));
        }

        self.open_parens.pop();
        self.ready_for_condition = false;
        self.position += 1;

        Ok(OutputNode::RightParen)
    }
}
