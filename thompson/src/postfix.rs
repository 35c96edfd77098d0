use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::debug;

use crate::error::RegexError;
use crate::token::{Token, TokenSequence};

/// An expression in postfix order with every concatenation explicit.
/// Never contains parentheses.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Postfix {
    tokens: Vec<Token>,
}

impl Postfix {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Rewrites an infix expression into postfix with the shunting-yard algorithm.
///
/// Binary operators of equal precedence pop each other, so they are
/// left-associative. Quantifiers go straight to the output: their operand is
/// always the one just completed, so `a.b+` repeats `b` alone (`ab+.`).
pub fn rewrite(expression: &str) -> Result<Postfix, RegexError> {
    let seq = TokenSequence::try_from(expression)?.with_explicit_concatenation();

    let mut output = Vec::with_capacity(expression.len() * 2);
    // parentheses keep their position for error reporting
    let mut operators: Vec<(usize, Token)> = Vec::new();

    for (pos, token) in seq {
        match token {
            Token::Literal(_) | Token::Star | Token::Plus | Token::QuestionMark => {
                output.push(token)
            }
            Token::LParen => operators.push((pos, token)),
            Token::RParen => loop {
                match operators.pop() {
                    Some((_, Token::LParen)) => break,
                    Some((_, op)) => output.push(op),
                    None => return Err(RegexError::unbalanced(pos)),
                }
            },
            op => {
                while let Some(&(_, top)) = operators.last() {
                    if !top.is_operator() || top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push((pos, op));
            }
        }
    }

    while let Some((pos, op)) = operators.pop() {
        if op == Token::LParen {
            return Err(RegexError::unbalanced(pos));
        }
        output.push(op);
    }

    let postfix = Postfix { tokens: output };
    debug!("rewrote '{expression}' into postfix '{postfix}'");
    Ok(postfix)
}

impl Display for Postfix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.tokens.iter().try_for_each(|token| write!(f, "{token}"))
    }
}

/// Reads text that is already in postfix order: no concatenation is inserted
/// and parentheses are rejected.
impl FromStr for Postfix {
    type Err = RegexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = TokenSequence::try_from(s)?
            .map(|(pos, token)| {
                if token.is_parenthesis() {
                    Err(RegexError::unsupported(char::from(token), pos))
                } else {
                    Ok(token)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Postfix { tokens })
    }
}

impl TryFrom<&str> for Postfix {
    type Error = RegexError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
