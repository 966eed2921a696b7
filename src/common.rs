use std::fmt::{self, Write};
pub use vec1::vec1;

pub type Int = i64;
pub type Float = f64;

/// Number of dice in a term, or the `n` of a keep modifier.
pub type Count = usize;

/// Number of faces on a die.
pub type Faces = u32;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Pos,
    Neg,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Pos => '+',
            Self::Neg => '-',
        };
        f.write_char(c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    /// Binding power; higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        };
        f.write_char(c)
    }
}

/// A keep modifier attached to a dice term, e.g. the `kh1` of `2d20kh1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Modifier {
    KeepHighest(Count),
    KeepLowest(Count),
}

impl Modifier {
    pub const fn n(self) -> Count {
        match self {
            Self::KeepHighest(n) | Self::KeepLowest(n) => n,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepHighest(n) => write!(f, "kh{}", n),
            Self::KeepLowest(n) => write!(f, "kl{}", n),
        }
    }
}
