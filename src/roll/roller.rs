use crate::common::Int;
use rand::Rng;

/// Where dice get their values from.
///
/// Every [`rand::Rng`] is a random source. [`ScriptedSource`] replays fixed values for hosts
/// that roll elsewhere and for tests.
pub trait RandomSource {
    /// A uniformly distributed integer in `[min, max]`.
    fn next_int(&mut self, min: Int, max: Int) -> Int;
}

impl<R: Rng> RandomSource for R {
    fn next_int(&mut self, min: Int, max: Int) -> Int {
        self.gen_range(min..=max)
    }
}

/// Replays a fixed sequence of values, starting over once it runs out.
///
/// Values outside the requested range are clamped into it. An empty script always yields `min`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: Vec<Int>,
    drawn: usize,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = Int>) -> Self {
        Self {
            values: values.into_iter().collect(),
            drawn: 0,
        }
    }

    /// How many values have been handed out so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedSource {
    fn next_int(&mut self, min: Int, max: Int) -> Int {
        let value = if self.values.is_empty() {
            min
        } else {
            self.values[self.drawn % self.values.len()]
        };
        self.drawn += 1;
        value.clamp(min, max)
    }
}
