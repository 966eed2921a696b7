use super::RandomSource;
use crate::common::*;
use crate::parse::DiceTerm;

/// The dice drawn for one term and which of them count towards its total.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DiceOutcome {
    faces: Faces,
    rolls: NonEmpty<Int>,
    retained: Vec<Int>,
    #[serde(skip)]
    retained_indices: Vec<usize>,
}

impl DiceOutcome {
    pub fn faces(&self) -> Faces {
        self.faces
    }

    /// Every die drawn, in draw order.
    pub fn rolls(&self) -> &NonEmpty<Int> {
        &self.rolls
    }

    /// The dice that survived every modifier, in draw order.
    pub fn retained(&self) -> &[Int] {
        &self.retained
    }

    pub fn is_retained(&self, index: usize) -> bool {
        self.retained_indices.binary_search(&index).is_ok()
    }

    pub fn total(&self) -> Int {
        self.retained.iter().sum()
    }
}

/// Draws the dice for `term` and applies its modifiers in order.
///
/// Each modifier selects from the dice the previous ones kept. Ties go to the die drawn first.
pub fn evaluate<R: RandomSource + ?Sized>(term: &DiceTerm, rng: &mut R) -> DiceOutcome {
    let faces = term.faces();
    let max = Int::from(faces);

    let mut rolls = vec1![rng.next_int(1, max)];
    for _ in 1..term.count() {
        rolls.push(rng.next_int(1, max));
    }

    let mut kept: Vec<usize> = (0..rolls.len()).collect();
    for modifier in term.modifiers() {
        kept = keep(&rolls, kept, *modifier);
    }

    DiceOutcome {
        faces,
        retained: kept.iter().map(|&i| rolls[i]).collect(),
        rolls,
        retained_indices: kept,
    }
}

fn keep(rolls: &[Int], mut kept: Vec<usize>, modifier: Modifier) -> Vec<usize> {
    // `sort_by_key` is stable, so equal values stay in draw order
    match modifier {
        Modifier::KeepHighest(_) => kept.sort_by_key(|&i| std::cmp::Reverse(rolls[i])),
        Modifier::KeepLowest(_) => kept.sort_by_key(|&i| rolls[i]),
    }
    kept.truncate(modifier.n());
    kept.sort_unstable();
    kept
}
