mod ctx;
mod dice;
mod num;
mod roller;
mod session;
mod stringify;

pub use ctx::RollContext;
pub use dice::{evaluate as evaluate_term, DiceOutcome};
pub use num::Number;
pub use roller::{RandomSource, ScriptedSource};
pub use session::{evaluate, evaluate_deterministic, RollResult, RollSession};
pub use stringify::{MarkdownStringifier, SimpleStringifier, Stringify};
