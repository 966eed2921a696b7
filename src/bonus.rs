//! Situational bonuses given as free-form formulas.

use crate::bindings::Bindings;
use crate::common::{Float, Int};
use crate::error::RResult;
use crate::parse::{parse, ExpressionTree};
use crate::roll::{evaluate_deterministic, Number};

/// Reduces a bonus formula to a single number for display.
///
/// An empty bonus is zero and a finite numeric literal is itself. A formula without dice is
/// evaluated. Formulas that roll dice, or fail to parse, count as zero; parse failures are logged.
pub fn simplify_bonus(bonus: &str, bindings: &Bindings) -> Number {
    let bonus = bonus.trim();
    if bonus.is_empty() {
        return Number::ZERO;
    }
    if let Ok(x) = bonus.parse::<Int>() {
        return Number::Int(x);
    }
    if let Ok(x) = bonus.parse::<Float>() {
        return if x.is_finite() {
            Number::Float(x).normalize()
        } else {
            Number::ZERO
        };
    }

    match parse(bonus, bindings) {
        Ok(tree) => evaluate_deterministic(&tree)
            .map(|result| result.total())
            .unwrap_or(Number::ZERO),
        Err(e) => {
            tracing::warn!(bonus, error = %e, "could not simplify bonus");
            Number::ZERO
        }
    }
}

/// Appends a situational bonus to `tree`, joined with `-` when the bonus leads with a minus sign.
///
/// An empty bonus returns the tree unchanged.
pub fn append_bonus(tree: &ExpressionTree, bonus: &str, bindings: &Bindings) -> RResult<ExpressionTree> {
    if bonus.trim().is_empty() {
        return Ok(tree.clone());
    }
    let bonus = parse(bonus, bindings)?;
    Ok(tree.append(bonus.into_root()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;

    #[test]
    fn test_simplify_bonus() {
        let data = bindings(&[("prof", 2), ("mod", 3)]);
        assert_eq!(simplify_bonus("", &data), Number::Int(0));
        assert_eq!(simplify_bonus("  ", &data), Number::Int(0));
        assert_eq!(simplify_bonus("4", &data), Number::Int(4));
        assert_eq!(simplify_bonus("-2", &data), Number::Int(-2));
        assert_eq!(simplify_bonus("1.5", &data), Number::Float(1.5));
        assert_eq!(simplify_bonus("@prof + @mod", &data), Number::Int(5));
        assert_eq!(simplify_bonus("@prof * 2 - 1", &data), Number::Int(3));
    }

    #[test]
    fn test_simplify_bonus_falls_back_to_zero() {
        let data = bindings(&[("prof", 2)]);
        assert_eq!(simplify_bonus("1d4 + @prof", &data), Number::Int(0));
        assert_eq!(simplify_bonus("@missing", &data), Number::Int(0));
        assert_eq!(simplify_bonus("2 +", &data), Number::Int(0));
        assert_eq!(simplify_bonus("NaN", &data), Number::Int(0));
        assert_eq!(simplify_bonus("inf", &data), Number::Int(0));
        assert_eq!(simplify_bonus("-infinity", &data), Number::Int(0));
    }

    #[test]
    fn test_append_bonus() {
        let data = bindings(&[("prof", 2)]);
        let tree = parse("1d20 + 3", &data).unwrap();
        assert_eq!(append_bonus(&tree, "@prof", &data).unwrap().to_string(), "1d20 + 3 + 2");
        assert_eq!(append_bonus(&tree, "-1d4", &data).unwrap().to_string(), "1d20 + 3 - 1d4");
        assert_eq!(
            append_bonus(&tree, "1d4 + 1", &data).unwrap().to_string(),
            "1d20 + 3 + (1d4 + 1)"
        );
        assert_eq!(append_bonus(&tree, "", &data).unwrap(), tree);
        assert!(append_bonus(&tree, "@missing", &data).is_err());
    }
}
