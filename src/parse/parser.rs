use super::{ast::*, lexer::*};
use crate::bindings::{Binding, Bindings};
use crate::common::*;
use crate::error::{RResult, RollError};
use logos_iter::LogosIter;

pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    bindings: &'a Bindings,
    /// Variables currently being substituted, outermost first.
    resolving: Vec<&'a str>,
    depth: usize,
    /// Nodes built so far, substituted bindings included.
    nodes: usize,
}

impl<'a> Parser<'a> {
    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MULTIPLICATION_OPS: &'static [TokenKind] = &[TokenKind::Star, TokenKind::Slash];

    const UNARY_PREFIX_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MODIFIERS: &'static [TokenKind] = &[
        TokenKind::Keep,
        TokenKind::KeepHighest,
        TokenKind::KeepLowest,
    ];

    const MAX_DEPTH: usize = 256;

    const MAX_NODES: usize = 1024;

    const ATOMS: &'static [TokenKind] = &[
        TokenKind::Integer,
        TokenKind::Decimal,
        TokenKind::Dice,
        TokenKind::Variable,
        TokenKind::LeftParen,
    ];

    pub fn new(s: &'a str, bindings: &'a Bindings) -> Self {
        Self {
            source: s,
            lexer: lexer(s),
            bindings,
            resolving: Vec::new(),
            depth: 0,
            nodes: 0,
        }
    }

    pub fn parse(mut self) -> RResult<ExpressionTree> {
        let root = self.parse_root()?;
        tracing::trace!(formula = self.source, parsed = %root, "parsed formula");
        Ok(ExpressionTree::new(root))
    }

    fn parse_root(&mut self) -> RResult<Node> {
        if self.lexer.peek().is_none() {
            return Err(RollError::malformed(0, "empty formula"));
        }

        let root = self.parse_node()?;
        if self.lexer.peek().is_some() {
            return self.unexpected_token(&[]);
        }
        Ok(root)
    }

    fn add_node(&mut self, node: Node) -> RResult<Node> {
        self.nodes += 1;
        if self.nodes > Self::MAX_NODES {
            return Err(RollError::malformed(self.lexer.span().start, "formula too long"));
        }
        Ok(node)
    }

    /// Parses one nesting level deeper, failing past [`Self::MAX_DEPTH`].
    fn nest<T>(&mut self, f: impl FnOnce(&mut Self) -> RResult<T>) -> RResult<T> {
        if self.depth >= Self::MAX_DEPTH {
            return Err(RollError::malformed(
                self.lexer.span().start,
                "formula nested too deeply",
            ));
        }
        self.depth += 1;
        let ret = f(self);
        self.depth -= 1;
        ret
    }

    fn advance(&mut self) -> Option<TokenKind> {
        self.lexer.next()
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn matches_any(&mut self, options: &[TokenKind]) -> bool {
        self.lexer
            .peek()
            .map_or(false, |peeked| options.contains(peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> RResult<()> {
        if self.matches(expected) {
            self.advance();
            Ok(())
        } else {
            self.unexpected_token(&[expected])
        }
    }

    fn unexpected_token<T>(&mut self, expected: &[TokenKind]) -> RResult<T> {
        let found = self.advance();
        let reason = match found {
            Some(TokenKind::ErrBadDice) => {
                return Err(RollError::MalformedDiceTerm(self.lexer.slice().to_string()))
            }
            Some(TokenKind::Error) => format!("unrecognized input {:?}", self.lexer.slice()),
            Some(_) => format!("unexpected {:?}", self.lexer.slice()),
            None => "unexpected end of formula".to_string(),
        };
        let position = match found {
            Some(_) => self.lexer.span().start,
            None => self.source.len(),
        };

        Err(RollError::malformed(
            position,
            if expected.is_empty() {
                reason
            } else {
                format!("{}; expected {}", reason, fmt_expected(expected))
            },
        ))
    }

    fn parse_node(&mut self) -> RResult<Node> {
        self.parse_addition()
    }

    fn parse_addition(&mut self) -> RResult<Node> {
        let mut lhs = self.parse_multiplication()?;

        while let Some(op) = self.parse_binary_op(Self::ADDITION_OPS) {
            let rhs = self.parse_multiplication()?;
            lhs = self.add_node(Node::new_binary(lhs, op, rhs))?;
        }

        Ok(lhs)
    }

    fn parse_multiplication(&mut self) -> RResult<Node> {
        let mut lhs = self.parse_unary_prefix()?;

        while let Some(op) = self.parse_binary_op(Self::MULTIPLICATION_OPS) {
            let rhs = self.parse_unary_prefix()?;
            lhs = self.add_node(Node::new_binary(lhs, op, rhs))?;
        }

        Ok(lhs)
    }

    fn parse_binary_op(&mut self, options: &[TokenKind]) -> Option<BinaryOperator> {
        if self.matches_any(options) {
            self.advance().and_then(|kind| kind.as_binary_op())
        } else {
            None
        }
    }

    fn parse_unary_prefix(&mut self) -> RResult<Node> {
        if self.matches_any(Self::UNARY_PREFIX_OPS) {
            let op = self.advance().and_then(|kind| kind.as_unary_op());
            let rhs = self.nest(Self::parse_unary_prefix)?;
            match op {
                Some(op) => self.add_node(Node::new_unary(op, rhs)),
                None => Ok(rhs),
            }
        } else {
            self.parse_atom()
        }
    }

    fn parse_atom(&mut self) -> RResult<Node> {
        let mut atom = match self.lexer.peek().copied() {
            Some(TokenKind::LeftParen) => self.parse_parens(),
            Some(TokenKind::Integer) => self.parse_integer(),
            Some(TokenKind::Decimal) => self.parse_decimal(),
            Some(TokenKind::Dice) => self.parse_dice(),
            Some(TokenKind::Variable) => self.parse_variable(),
            _ => self.unexpected_token(Self::ATOMS),
        }?;

        if self.matches(TokenKind::Flavor) {
            self.advance();
            let slice = self.lexer.slice();
            let flavor = slice[1..slice.len() - 1].trim();
            if !flavor.is_empty() {
                atom.apply_flavor(flavor);
            }
        }

        Ok(atom)
    }

    fn parse_parens(&mut self) -> RResult<Node> {
        self.consume(TokenKind::LeftParen)?;
        let inner = self.nest(Self::parse_node)?;
        self.consume(TokenKind::RightParen)?;
        self.add_node(Node::new_grouping(inner))
    }

    fn parse_integer(&mut self) -> RResult<Node> {
        self.consume(TokenKind::Integer)?;
        let x = self
            .lexer
            .slice()
            .parse::<Int>()
            .map_err(|why| RollError::malformed(self.lexer.span().start, why))?;
        self.add_node(Node::new_numeric(x))
    }

    fn parse_decimal(&mut self) -> RResult<Node> {
        self.consume(TokenKind::Decimal)?;
        let x = self
            .lexer
            .slice()
            .parse::<Float>()
            .map_err(|why| RollError::malformed(self.lexer.span().start, why))?;
        self.add_node(Node::new_numeric(x))
    }

    fn parse_dice(&mut self) -> RResult<Node> {
        self.consume(TokenKind::Dice)?;
        let source = self.source;
        let token = &source[self.lexer.span()];
        let bad_dice = || RollError::MalformedDiceTerm(token.to_string());

        let (count, faces) = token
            .split_once(|c: char| c == 'd' || c == 'D')
            .ok_or_else(bad_dice)?;
        let count = if count.is_empty() {
            1
        } else {
            count.parse::<Count>().map_err(|_| bad_dice())?
        };
        let faces = faces.parse::<Faces>().map_err(|_| bad_dice())?;
        if count < 1 || faces < 1 {
            return Err(bad_dice());
        }

        let mut modifiers = Vec::new();
        while self.matches_any(Self::MODIFIERS) {
            modifiers.push(self.parse_modifier()?);
        }

        let term = DiceTerm::new(count, faces, modifiers)?;
        self.add_node(Node::Dice(term))
    }

    fn parse_modifier(&mut self) -> RResult<Modifier> {
        let kind = self.advance();
        let n = if self.matches(TokenKind::Integer) {
            self.advance();
            self.lexer
                .slice()
                .parse::<Count>()
                .map_err(|why| RollError::malformed(self.lexer.span().start, why))?
        } else {
            1
        };

        Ok(match kind {
            Some(TokenKind::KeepLowest) => Modifier::KeepLowest(n),
            _ => Modifier::KeepHighest(n),
        })
    }

    fn parse_variable(&mut self) -> RResult<Node> {
        self.consume(TokenKind::Variable)?;
        let (source, span) = (self.source, self.lexer.span());
        let name = &source[span.start + 1..span.end];

        if self.resolving.contains(&name) {
            return Err(RollError::CyclicBinding(name.to_string()));
        }

        let bindings = self.bindings;
        match bindings.get(name) {
            None => Err(RollError::UnboundVariable(name.to_string())),
            Some(Binding::Int(x)) => self.add_node(Node::new_numeric(*x)),
            Some(Binding::Float(x)) => self.add_node(Node::new_numeric(*x)),
            Some(Binding::Formula(formula)) => self.parse_substitution(name, formula),
        }
    }

    /// Parses a formula binding in place of its reference.
    ///
    /// The nested parser shares this parser's depth and node budget, so a chain of bindings
    /// that each reference the next several times cannot grow without bound.
    fn parse_substitution(&mut self, name: &'a str, formula: &'a str) -> RResult<Node> {
        if formula.trim().is_empty() {
            return self.add_node(Node::new_numeric(0));
        }

        let mut nested = Parser::new(formula, self.bindings);
        nested.resolving = self.resolving.clone();
        nested.resolving.push(name);
        nested.depth = self.depth;
        nested.nodes = self.nodes;
        let node = nested.nest(Self::parse_root)?;
        self.nodes = nested.nodes;

        if node.is_atom() {
            Ok(node)
        } else {
            self.add_node(Node::new_grouping(node))
        }
    }
}

fn fmt_expected(expected: &[TokenKind]) -> String {
    match expected {
        [] => String::new(),
        [a] => a.to_str().to_string(),
        [a, b] => format!("{} or {}", a.to_str(), b.to_str()),
        [init @ .., last] => {
            let init: Vec<_> = init.iter().map(TokenKind::to_str).collect();
            format!("{}, or {}", init.join(", "), last.to_str())
        }
    }
}
