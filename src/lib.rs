//! Dice formulas for d20 checks.
//!
//! A formula such as `1d20 + @aptitudes.might.mod` is [parsed](parse()) against a set of
//! [`Bindings`], has its check die [resolved](advantage::resolve) for advantage or disadvantage,
//! and is then [evaluated](roll::evaluate) into a [`RollResult`]. [`RollSession`] ties the steps
//! together.
//!
//! ```
//! use d20_roll::{AdvantageMode, Bindings, RollSession, ScriptedSource};
//!
//! let bindings = Bindings::new().with("mod", 2);
//! let session = RollSession::new("1d20 + @mod", bindings)
//!     .unwrap()
//!     .with_mode(AdvantageMode::Advantage, false)
//!     .unwrap();
//! let result = session.evaluate(&mut ScriptedSource::new([7, 15]));
//! assert_eq!(result.formula(), "2d20kh1 + 2");
//! assert_eq!(result.total().as_int(), 17);
//! ```

pub mod advantage;
mod aptitude;
mod bindings;
pub mod bonus;
mod common;
pub mod config;
mod error;
pub mod parse;
pub mod roll;

pub use advantage::AdvantageMode;
pub use aptitude::Aptitude;
pub use bindings::{Binding, Bindings};
pub use bonus::{append_bonus, simplify_bonus};
pub use common::{BinaryOperator, Count, Faces, Float, Int, Modifier, NonEmpty, UnaryOperator};
pub use config::RollConfig;
pub use error::{RResult, RollError};
pub use parse::{parse, ExpressionTree};
pub use roll::{
    MarkdownStringifier, Number, RandomSource, RollResult, RollSession, ScriptedSource,
    SimpleStringifier, Stringify,
};

/// Parses and rolls `formula` with the thread-local RNG.
pub fn roll(formula: &str, bindings: &Bindings) -> RResult<RollResult> {
    let session = RollSession::new(formula, bindings.clone())?;
    Ok(session.evaluate(&mut rand::thread_rng()))
}
