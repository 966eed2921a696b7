use crate::common::*;
use std::fmt;

/// A numeric value produced by evaluation.
///
/// Integer arithmetic stays integral; division only produces an integer when it is exact.
#[derive(Debug, Copy, Clone)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    pub(crate) const ZERO: Self = Self::Int(0);

    pub fn as_int(self) -> Int {
        match self {
            Self::Int(x) => x,
            Self::Float(x) => x as Int,
        }
    }

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
        }
    }

    /// Collapses integral floats back to [`Number::Int`].
    pub(crate) fn normalize(self) -> Self {
        match self {
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < Int::MAX as Float => {
                Self::Int(x as Int)
            }
            _ => self,
        }
    }
}

impl std::ops::Neg for Number {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Self::Int(x) => x
                .checked_neg()
                .map_or(Self::Float(-(x as Float)), Self::Int),
            Self::Float(x) => Self::Float(-x),
        }
    }
}

macro_rules! num_impl_bin_op {
    ($Name:ident, $fn_name:ident, $checked:ident) => {
        impl std::ops::$Name for Number {
            type Output = Self;

            fn $fn_name(self, rhs: Self) -> Self::Output {
                match (self, rhs) {
                    (Self::Int(x), Self::Int(y)) => x.$checked(y).map_or_else(
                        || Self::Float(std::ops::$Name::$fn_name(x as Float, y as Float)),
                        Self::Int,
                    ),
                    (x, y) => Self::Float(std::ops::$Name::$fn_name(x.as_float(), y.as_float())),
                }
            }
        }
    };
}

num_impl_bin_op!(Add, add, checked_add);
num_impl_bin_op!(Sub, sub, checked_sub);
num_impl_bin_op!(Mul, mul, checked_mul);

impl std::ops::Div for Number {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Int(x), Self::Int(y)) if x.checked_rem(y) == Some(0) => Self::Int(x / y),
            (x, y) => Self::Float(x.as_float() / y.as_float()),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x == y,
            (x, y) => x.as_float().eq(&y.as_float()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x.partial_cmp(y),
            (x, y) => x.as_float().partial_cmp(&y.as_float()),
        }
    }
}

impl From<Int> for Number {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Number {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Display::fmt(x, f),
        }
    }
}

impl serde::Serialize for Number {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Int(x) => serializer.serialize_i64(x),
            Self::Float(x) => serializer.serialize_f64(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_stays_integral() {
        assert!(matches!(Number::Int(2) + Number::Int(3), Number::Int(5)));
        assert!(matches!(Number::Int(2) * Number::Int(-3), Number::Int(-6)));
        assert!(matches!(Number::Int(9) / Number::Int(3), Number::Int(3)));
    }

    #[test]
    fn test_inexact_division_is_float() {
        assert_eq!(Number::Int(7) / Number::Int(2), Number::Float(3.5));
        assert!(matches!(Number::Int(7) / Number::Int(2), Number::Float(_)));
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let x = Number::Int(1) / Number::Int(0);
        assert!(x.as_float().is_infinite());
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        assert!(matches!(Number::Int(Int::MAX) + Number::Int(1), Number::Float(_)));
        assert!(matches!(-Number::Int(Int::MIN), Number::Float(_)));
        assert!(matches!(Number::Int(Int::MIN) - Number::Int(1), Number::Float(_)));
        assert!(matches!(Number::Int(Int::MAX) * Number::Int(2), Number::Float(_)));
        assert!(matches!(Number::Int(Int::MIN) / Number::Int(-1), Number::Float(_)));
        assert_eq!(Number::Int(2) * Number::Float(1.5), Number::Float(3.0));
        assert_eq!(Number::Float(0.5) - Number::Int(2), Number::Float(-1.5));
    }

    #[test]
    fn test_normalize() {
        assert!(matches!(Number::Float(4.0).normalize(), Number::Int(4)));
        assert!(matches!(Number::Float(4.5).normalize(), Number::Float(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::Int(12).to_string(), "12");
        assert_eq!(Number::Float(2.5).to_string(), "2.5");
    }
}
