use crate::common::*;
use logos::{Lexer as LogosLexer, Logos};
use logos_iter::{LogosIter, PeekableLexer};
use std::fmt;

pub type Lexer<'a> = PeekableLexer<'a, LogosLexer<'a, TokenKind>, TokenKind>;

pub fn lexer(s: &str) -> Lexer<'_> {
    TokenKind::lexer(s).peekable_lexer()
}

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"([0-9]+\.[0-9]*)|(\.[0-9]+)")]
    Decimal,

    #[regex(r"[0-9]*[dD][0-9]+")]
    Dice,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_.]*")]
    Variable,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("k")]
    Keep,
    #[token("kh")]
    KeepHighest,
    #[token("kl")]
    KeepLowest,

    #[regex(r"\[[^\]]*\]")]
    Flavor,

    // A `d` with no face count, e.g. `2d` or `3dx`
    #[regex(r"[0-9]*[dD]")]
    ErrBadDice,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn to_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Decimal => "<decimal>",
            Dice => "<dice>",
            Variable => "<@variable>",
            LeftParen => "'('",
            RightParen => "')'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Keep => "'k'",
            KeepHighest => "'kh'",
            KeepLowest => "'kl'",
            Flavor => "<flavor>",
            ErrBadDice | Error => "<error>",
        }
    }

    pub fn as_unary_op(&self) -> Option<UnaryOperator> {
        use UnaryOperator::*;
        Some(match self {
            Self::Plus => Pos,
            Self::Minus => Neg,
            _ => return None,
        })
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        TokenKind::lexer(s).collect()
    }

    #[test]
    fn test_lex_dice_with_modifiers() {
        use TokenKind::*;
        assert_eq!(kinds("2d20kh1"), vec![Dice, KeepHighest, Integer]);
        assert_eq!(kinds("d20 kl"), vec![Dice, KeepLowest]);
        assert_eq!(kinds("4d6k3"), vec![Dice, Keep, Integer]);
    }

    #[test]
    fn test_lex_formula() {
        use TokenKind::*;
        assert_eq!(
            kinds("1d20 + @aptitudes.might.mod - 2.5 * (3 / 1)"),
            vec![
                Dice, Plus, Variable, Minus, Decimal, Star, LeftParen, Integer, Slash, Integer,
                RightParen
            ]
        );
        assert_eq!(kinds("1d6[fire] + 1"), vec![Dice, Flavor, Plus, Integer]);
    }

    #[test]
    fn test_lex_bad_dice() {
        use TokenKind::*;
        assert_eq!(kinds("2d"), vec![ErrBadDice]);
        assert_eq!(kinds("3dx"), vec![ErrBadDice, Error]);
        assert_eq!(kinds("2 $"), vec![Integer, Error]);
    }
}
