#[cfg(test)]
use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::error::RegexError;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Serialize))]
pub enum Token {
    Literal(char),
    Concat,
    Alter,
    Star,
    Plus,
    QuestionMark,
    LParen,
    RParen,
}

impl Token {
    /// Binding strength of an operator, higher binds tighter.
    /// Literals and parentheses have none.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Token::Star => Some(50),
            Token::Concat | Token::Plus => Some(40),
            Token::QuestionMark => Some(35),
            Token::Alter => Some(30),
            Token::Literal(_) | Token::LParen | Token::RParen => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        self.precedence().is_some()
    }

    pub fn is_parenthesis(&self) -> bool {
        matches!(self, Token::LParen | Token::RParen)
    }

    /// Number of fragments the operator consumes during construction.
    pub fn arity(&self) -> usize {
        match self {
            Token::Concat | Token::Alter => 2,
            Token::Star | Token::Plus | Token::QuestionMark => 1,
            Token::Literal(_) | Token::LParen | Token::RParen => 0,
        }
    }

    fn closes_operand(&self) -> bool {
        matches!(
            self,
            Token::Literal(_) | Token::Star | Token::Plus | Token::QuestionMark | Token::RParen
        )
    }

    fn opens_operand(&self) -> bool {
        matches!(self, Token::Literal(_) | Token::LParen)
    }
}

/// Tokens of an infix expression, each paired with the char index it came from.
#[derive(Clone, Debug)]
pub(crate) struct TokenSequence {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl TokenSequence {
    pub fn new(tokens: Vec<(usize, Token)>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn next_enumerated(&mut self) -> Option<(usize, Token)> {
        let next = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(next)
    }

    /// Materializes the concatenations the user left implicit: a literal or a
    /// closed group followed by a literal or an opening group.
    /// Inserted tokens take the position of the token they precede.
    pub fn with_explicit_concatenation(self) -> Self {
        let mut res = Vec::with_capacity(self.tokens.len() * 2);
        let mut iter = self.tokens.into_iter().peekable();

        while let Some((pos, token)) = iter.next() {
            res.push((pos, token));
            if let Some(&(next_pos, next)) = iter.peek() {
                if token.closes_operand() && next.opens_operand() {
                    res.push((next_pos, Token::Concat));
                }
            }
        }
        Self::new(res)
    }
}

impl Iterator for TokenSequence {
    type Item = (usize, Token);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_enumerated()
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(self))
    }
}

impl From<&Token> for char {
    fn from(value: &Token) -> Self {
        match value {
            Token::Literal(c) => *c,
            Token::Concat => '.',
            Token::Alter => '|',
            Token::Star => '*',
            Token::Plus => '+',
            Token::QuestionMark => '?',
            Token::LParen => '(',
            Token::RParen => ')',
        }
    }
}

impl From<Token> for char {
    fn from(value: Token) -> Self {
        char::from(&value)
    }
}

impl TryFrom<char> for Token {
    /// The rejected char.
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '.' => Ok(Token::Concat),
            '|' => Ok(Token::Alter),
            '*' => Ok(Token::Star),
            '+' => Ok(Token::Plus),
            '?' => Ok(Token::QuestionMark),
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            c if c.is_alphanumeric() => Ok(Token::Literal(c)),
            c => Err(c),
        }
    }
}

impl TryFrom<&str> for TokenSequence {
    type Error = RegexError;

    fn try_from(pattern: &str) -> Result<Self, Self::Error> {
        let tokens = pattern
            .chars()
            .enumerate()
            .map(|(pos, c)| {
                Token::try_from(c)
                    .map(|token| (pos, token))
                    .map_err(|ch| RegexError::unsupported(ch, pos))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TokenSequence::new(tokens))
    }
}
