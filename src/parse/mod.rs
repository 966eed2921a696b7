pub mod ast;
mod lexer;
mod parser;

use crate::bindings::Bindings;
use crate::error::RResult;

pub use ast::{Binary, DiceTerm, ExpressionTree, Grouping, Node, NumericTerm, Unary, CHECK_DIE_FACES};

/// Parses `formula`, substituting every `@name` from `bindings`.
///
/// Parsing is pure: no dice are rolled and nothing is logged above `trace` level.
///
/// # Examples
/// ```
/// use d20_roll::{parse, Bindings};
///
/// let bindings = Bindings::new().with("mod", 3);
/// let tree = parse("2d20kh1 + @mod", &bindings).unwrap();
/// assert_eq!(tree.to_string(), "2d20kh1 + 3");
/// ```
pub fn parse(formula: &str, bindings: &Bindings) -> RResult<ExpressionTree> {
    parser::Parser::new(formula, bindings).parse()
}
