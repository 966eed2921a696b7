use crate::common::{Count, Modifier};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error("no value bound for variable @{0}")]
    UnboundVariable(String),
    #[error("variable @{0} refers back to itself")]
    CyclicBinding(String),
    #[error("malformed formula at position {position}: {reason}")]
    MalformedFormula { position: usize, reason: String },
    #[error("malformed dice term {0:?}")]
    MalformedDiceTerm(String),
    #[error("modifier {modifier} is out of range for {count} dice")]
    ModifierOutOfRange { modifier: Modifier, count: Count },
    #[error("advantage requires a d20 in the formula")]
    NoCheckDie,
    #[error("too many dice rolled: {requested} requested, at most {max} allowed")]
    TooManyDice { requested: Count, max: Count },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RollError {
    pub(crate) fn malformed(position: usize, reason: impl ToString) -> Self {
        Self::MalformedFormula {
            position,
            reason: reason.to_string(),
        }
    }
}

pub type RResult<T> = Result<T, RollError>;
