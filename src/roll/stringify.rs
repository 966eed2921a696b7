use super::{DiceOutcome, Number, RollResult};
use crate::common::*;
use crate::parse::{Binary, DiceTerm, Grouping, Node, NumericTerm, Unary};
use std::slice;

type Outcomes<'a> = slice::Iter<'a, DiceOutcome>;

/// Renders a [`RollResult`] as its formula with every die shown, e.g. `2d20kh1 (10, 11) = 11`.
///
/// Implementors override the pieces they want to render differently.
pub trait Stringify {
    fn stringify(&mut self, result: &RollResult) -> String {
        let mut outcomes = result.dice().iter();
        let tree = self.str_node(result.tree().root(), &mut outcomes);
        self.str_total(tree, result.total())
    }

    fn str_total(&mut self, tree: String, total: Number) -> String {
        format!("{} = {}", tree, total)
    }

    fn str_node(&mut self, node: &Node, outcomes: &mut Outcomes<'_>) -> String {
        match node {
            Node::Numeric(term) => self.str_numeric(term),
            Node::Dice(term) => match outcomes.next() {
                Some(outcome) => self.str_dice(term, outcome),
                None => term.to_string(),
            },
            Node::Grouping(Grouping(inner)) => format!("({})", self.str_node(inner, outcomes)),
            Node::Unary(Unary { op, value }) => format!("{}{}", op, self.str_node(value, outcomes)),
            Node::Binary(Binary { left, op, right }) => {
                let l = self.str_node(left, outcomes);
                let r = self.str_node(right, outcomes);
                format!("{} {} {}", l, op, r)
            }
        }
    }

    fn str_numeric(&mut self, term: &NumericTerm) -> String {
        with_flavor(term.value.to_string(), term.flavor.as_deref())
    }

    fn str_dice(&mut self, term: &DiceTerm, outcome: &DiceOutcome) -> String {
        let the_dice = outcome
            .rolls()
            .iter()
            .enumerate()
            .map(|(i, &value)| self.str_die(value, outcome.faces(), outcome.is_retained(i)))
            .collect::<Vec<_>>()
            .join(", ");
        let the_ops: String = term.modifiers().iter().map(ToString::to_string).collect();
        let ret = format!("{}d{}{} ({})", term.count(), term.faces(), the_ops, the_dice);
        with_flavor(ret, term.flavor.as_deref())
    }

    fn str_die(&mut self, value: Int, _faces: Faces, _retained: bool) -> String {
        value.to_string()
    }
}

fn with_flavor(s: String, flavor: Option<&str>) -> String {
    match flavor {
        Some(flavor) => format!("{} [{}]", s, flavor),
        None => s,
    }
}

#[derive(Debug, Default)]
pub struct SimpleStringifier;

impl SimpleStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for SimpleStringifier {}

/// Like [`SimpleStringifier`], but strikes through dropped dice, bolds natural ones and maximums
/// and puts the total in a code span.
#[derive(Debug, Default)]
pub struct MarkdownStringifier;

impl MarkdownStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for MarkdownStringifier {
    fn str_total(&mut self, tree: String, total: Number) -> String {
        format!("{} = `{}`", tree, total)
    }

    fn str_die(&mut self, value: Int, faces: Faces, retained: bool) -> String {
        let mut ret = value.to_string();
        if value == 1 || value == Int::from(faces) {
            ret = format!("**{}**", ret);
        }
        if !retained {
            ret = format!("~~{}~~", ret);
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::roll::RollSession;

    macro_rules! check {
        ($cls:ident, $input:expr, $rolls:expr, $expected:expr) => {
            let session = RollSession::new($input, bindings(&[("mod", 2)])).unwrap();
            let result = session.evaluate(&mut scripted(&$rolls));
            let actual = $cls::new().stringify(&result);
            assert_eq!(&actual, $expected);
        };
    }

    #[test]
    fn test_simple_stringify() {
        check!(SimpleStringifier, "2 + 3", [], "2 + 3 = 5");
        check!(SimpleStringifier, "2d20", [10, 11], "2d20 (10, 11) = 21");
        check!(SimpleStringifier, "2d20kh1", [10, 11], "2d20kh1 (10, 11) = 11");
        check!(SimpleStringifier, "1d20 + @mod", [13], "1d20 (13) + 2 = 15");
        check!(
            SimpleStringifier,
            "(1d6[fire] + 1d4[cold]) * 2",
            [3, 4],
            "(1d6 (3) [fire] + 1d4 (4) [cold]) * 2 = 14"
        );
        check!(SimpleStringifier, "-1d4", [3], "-1d4 (3) = -3");
    }

    #[test]
    fn test_markdown_stringify() {
        check!(MarkdownStringifier, "2 + 3", [], "2 + 3 = `5`");
        check!(MarkdownStringifier, "2d20", [10, 11], "2d20 (10, 11) = `21`");
        check!(MarkdownStringifier, "2d20kh1", [10, 11], "2d20kh1 (~~10~~, 11) = `11`");
        check!(MarkdownStringifier, "3d20kl1", [20, 1, 1], "3d20kl1 (~~**20**~~, **1**, ~~**1**~~) = `1`");
        check!(MarkdownStringifier, "4d6k3 + @mod", [6, 2, 5, 3], "4d6kh3 (**6**, ~~2~~, 5, 3) + 2 = `16`");
    }
}
