use crate::common::*;
use crate::error::{RResult, RollError};
use crate::roll::{Number, RollContext};
use std::fmt;

/// Faces of the die that advantage and disadvantage apply to.
pub const CHECK_DIE_FACES: Faces = 20;

#[enum_dispatch::enum_dispatch]
pub(crate) trait Evaluate {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> Number;
}

/// A parsed formula. Cloning and transforming a tree never affects the original.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    root: Node,
}

impl ExpressionTree {
    pub(crate) fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn into_root(self) -> Node {
        self.root
    }

    /// All dice terms, left to right.
    pub fn dice_terms(&self) -> Vec<&DiceTerm> {
        let mut ret = Vec::new();
        self.root.collect_dice(&mut ret);
        ret
    }

    /// Total number of dice that evaluating this tree rolls, saturating at `Count::MAX`.
    pub fn dice_count(&self) -> Count {
        self.dice_terms()
            .iter()
            .fold(0, |total: Count, term| total.saturating_add(term.count()))
    }

    pub fn is_deterministic(&self) -> bool {
        self.dice_terms().is_empty()
    }

    /// The first d20 term, if any.
    pub fn check_die(&self) -> Option<&DiceTerm> {
        self.dice_terms()
            .into_iter()
            .find(|term| term.faces() == CHECK_DIE_FACES)
    }

    pub(crate) fn check_die_mut(&mut self) -> Option<&mut DiceTerm> {
        self.root.first_dice_mut(&|term| term.faces() == CHECK_DIE_FACES)
    }

    /// Joins another expression onto the end of this one.
    ///
    /// A leading sign on `other` becomes the joining operator, so appending `-2` to `1d20`
    /// reads `1d20 - 2` rather than `1d20 + -2`.
    pub fn append(&self, other: Node) -> Self {
        let (op, other) = match other {
            Node::Unary(Unary { op, value }) => {
                let op = match op {
                    UnaryOperator::Pos => BinaryOperator::Add,
                    UnaryOperator::Neg => BinaryOperator::Sub,
                };
                (op, *value)
            }
            other => (BinaryOperator::Add, other),
        };
        let other = match other {
            Node::Binary(_) => Node::new_grouping(other),
            other => other,
        };
        Self::new(Node::new_binary(self.root.clone(), op, other))
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch::enum_dispatch(Evaluate)]
pub enum Node {
    Numeric(NumericTerm),
    Dice(DiceTerm),
    Grouping(Grouping),
    Unary(Unary),
    Binary(Binary),
}

impl Node {
    pub(crate) fn new_numeric(value: impl Into<Number>) -> Self {
        Self::Numeric(NumericTerm::new(value.into()))
    }

    pub(crate) fn new_grouping(inner: Node) -> Self {
        Self::Grouping(Grouping(Box::new(inner)))
    }

    pub(crate) fn new_unary(op: UnaryOperator, value: Node) -> Self {
        Self::Unary(Unary {
            op,
            value: Box::new(value),
        })
    }

    pub(crate) fn new_binary(left: Node, op: BinaryOperator, right: Node) -> Self {
        Self::Binary(Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Whether the node can be spliced into a larger expression without parentheses.
    pub(crate) fn is_atom(&self) -> bool {
        matches!(self, Self::Numeric(_) | Self::Dice(_) | Self::Grouping(_))
    }

    /// Sets `flavor` on every term below this node that has none yet.
    pub(crate) fn apply_flavor(&mut self, flavor: &str) {
        match self {
            Self::Numeric(term) => {
                term.flavor.get_or_insert_with(|| flavor.to_owned());
            }
            Self::Dice(term) => {
                term.flavor.get_or_insert_with(|| flavor.to_owned());
            }
            Self::Grouping(Grouping(inner)) => inner.apply_flavor(flavor),
            Self::Unary(Unary { value, .. }) => value.apply_flavor(flavor),
            Self::Binary(Binary { left, right, .. }) => {
                left.apply_flavor(flavor);
                right.apply_flavor(flavor);
            }
        }
    }

    fn collect_dice<'a>(&'a self, out: &mut Vec<&'a DiceTerm>) {
        match self {
            Self::Numeric(_) => {}
            Self::Dice(term) => out.push(term),
            Self::Grouping(Grouping(inner)) => inner.collect_dice(out),
            Self::Unary(Unary { value, .. }) => value.collect_dice(out),
            Self::Binary(Binary { left, right, .. }) => {
                left.collect_dice(out);
                right.collect_dice(out);
            }
        }
    }

    fn first_dice_mut(&mut self, pred: &dyn Fn(&DiceTerm) -> bool) -> Option<&mut DiceTerm> {
        match self {
            Self::Numeric(_) => None,
            Self::Dice(term) => pred(term).then_some(term),
            Self::Grouping(Grouping(inner)) => inner.first_dice_mut(pred),
            Self::Unary(Unary { value, .. }) => value.first_dice_mut(pred),
            Self::Binary(Binary { left, right, .. }) => match left.first_dice_mut(pred) {
                Some(term) => Some(term),
                None => right.first_dice_mut(pred),
            },
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(term) => fmt::Display::fmt(term, f),
            Self::Dice(term) => fmt::Display::fmt(term, f),
            Self::Grouping(Grouping(inner)) => write!(f, "({})", inner),
            Self::Unary(Unary { op, value }) => write!(f, "{}{}", op, value),
            Self::Binary(Binary { left, op, right }) => write!(f, "{} {} {}", left, op, right),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericTerm {
    pub value: Number,
    pub flavor: Option<String>,
}

impl NumericTerm {
    pub fn new(value: Number) -> Self {
        Self {
            value,
            flavor: None,
        }
    }
}

impl Evaluate for NumericTerm {
    fn evaluate(&self, _ctx: &mut RollContext<'_>) -> Number {
        self.value
    }
}

impl fmt::Display for NumericTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)?;
        fmt_flavor(self.flavor.as_deref(), f)
    }
}

/// `NdX` with keep modifiers, e.g. `2d20kh1`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiceTerm {
    count: Count,
    faces: Faces,
    modifiers: Vec<Modifier>,
    pub flavor: Option<String>,
}

impl DiceTerm {
    pub fn new(count: Count, faces: Faces, modifiers: Vec<Modifier>) -> RResult<Self> {
        if count < 1 || faces < 1 {
            return Err(RollError::MalformedDiceTerm(format!("{}d{}", count, faces)));
        }
        if let Some(&modifier) = modifiers.iter().find(|m| m.n() < 1 || m.n() > count) {
            return Err(RollError::ModifierOutOfRange { modifier, count });
        }

        Ok(Self {
            count,
            faces,
            modifiers,
            flavor: None,
        })
    }

    pub fn count(&self) -> Count {
        self.count
    }

    pub fn faces(&self) -> Faces {
        self.faces
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Replaces the die count and modifiers. Callers keep every `n` within `1..=count`.
    pub(crate) fn configure(&mut self, count: Count, modifiers: Vec<Modifier>) {
        debug_assert!(modifiers.iter().all(|m| (1..=count).contains(&m.n())));
        self.count = count;
        self.modifiers = modifiers;
    }
}

impl Evaluate for DiceTerm {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> Number {
        ctx.roll_term(self)
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        for modifier in &self.modifiers {
            write!(f, "{}", modifier)?;
        }
        fmt_flavor(self.flavor.as_deref(), f)
    }
}

fn fmt_flavor(flavor: Option<&str>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match flavor {
        Some(flavor) => write!(f, "[{}]", flavor),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grouping(pub Box<Node>);

impl Evaluate for Grouping {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> Number {
        self.0.evaluate(ctx)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOperator,
    pub value: Box<Node>,
}

impl Evaluate for Unary {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> Number {
        let value = self.value.evaluate(ctx);
        match self.op {
            UnaryOperator::Pos => value,
            UnaryOperator::Neg => -value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Box<Node>,
    pub op: BinaryOperator,
    pub right: Box<Node>,
}

impl Evaluate for Binary {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> Number {
        use BinaryOperator::*;

        let left = self.left.evaluate(ctx);
        let right = self.right.evaluate(ctx);
        match self.op {
            Add => left + right,
            Sub => left - right,
            Mul => left * right,
            Div => left / right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::parse::parse;

    fn tree(s: &str) -> ExpressionTree {
        parse(s, &Bindings::new()).unwrap()
    }

    #[test]
    fn test_dice_term_validation() {
        assert!(DiceTerm::new(2, 20, vec![Modifier::KeepHighest(1)]).is_ok());
        assert_eq!(
            DiceTerm::new(0, 20, vec![]),
            Err(RollError::MalformedDiceTerm("0d20".to_string()))
        );
        assert_eq!(
            DiceTerm::new(1, 0, vec![]),
            Err(RollError::MalformedDiceTerm("1d0".to_string()))
        );
        assert_eq!(
            DiceTerm::new(2, 6, vec![Modifier::KeepLowest(3)]),
            Err(RollError::ModifierOutOfRange {
                modifier: Modifier::KeepLowest(3),
                count: 2
            })
        );
    }

    #[test]
    fn test_display_recompiles_formula() {
        assert_eq!(tree("2d20kh1 + 3").to_string(), "2d20kh1 + 3");
        assert_eq!(tree("d20+2*(1d4-1)").to_string(), "1d20 + 2 * (1d4 - 1)");
        assert_eq!(tree("1d6[fire] + 2").to_string(), "1d6[fire] + 2");
        assert_eq!(tree("-1d4").to_string(), "-1d4");
    }

    #[test]
    fn test_dice_terms_in_order() {
        let t = tree("1d6 + (2d8 - 1d20) * 3d4");
        let faces: Vec<_> = t.dice_terms().iter().map(|d| d.faces()).collect();
        assert_eq!(faces, vec![6, 8, 20, 4]);
        assert_eq!(t.dice_count(), 1 + 2 + 1 + 3);
        assert_eq!(
            tree(&format!("{}d6 + 1d6 + 1d6", Count::MAX)).dice_count(),
            Count::MAX
        );
        assert!(!t.is_deterministic());
        assert!(tree("2 + 3").is_deterministic());
    }

    #[test]
    fn test_check_die_is_first_d20() {
        let t = tree("1d6 + 1d20 + 2d20");
        assert_eq!(t.check_die().map(|d| d.count()), Some(1));
        assert_eq!(tree("1d6 + 4").check_die(), None);
    }

    #[test]
    fn test_append() {
        let base = tree("1d20 + 2");
        assert_eq!(base.append(tree("3").into_root()).to_string(), "1d20 + 2 + 3");
        assert_eq!(base.append(tree("-1").into_root()).to_string(), "1d20 + 2 - 1");
        assert_eq!(base.append(tree("1d4 - 1").into_root()).to_string(), "1d20 + 2 + (1d4 - 1)");
        assert_eq!(base.to_string(), "1d20 + 2");
    }
}
