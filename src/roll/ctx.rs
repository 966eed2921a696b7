use super::{dice, DiceOutcome, Number, RandomSource};
use crate::parse::DiceTerm;

/// State threaded through a single evaluation: the random source and every dice outcome so far.
pub struct RollContext<'r> {
    rng: &'r mut dyn RandomSource,
    outcomes: Vec<DiceOutcome>,
}

impl<'r> RollContext<'r> {
    pub fn new(rng: &'r mut dyn RandomSource) -> Self {
        Self {
            rng,
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn roll_term(&mut self, term: &DiceTerm) -> Number {
        let outcome = dice::evaluate(term, &mut *self.rng);
        let total = outcome.total();
        self.outcomes.push(outcome);
        Number::Int(total)
    }

    pub(crate) fn into_outcomes(self) -> Vec<DiceOutcome> {
        self.outcomes
    }
}
