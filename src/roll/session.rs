use super::{DiceOutcome, Number, RandomSource, RollContext, ScriptedSource};
use crate::advantage::{resolve, AdvantageMode};
use crate::aptitude::Aptitude;
use crate::bindings::{Binding, Bindings};
use crate::bonus::append_bonus;
use crate::common::*;
use crate::config::RollConfig;
use crate::error::{RResult, RollError};
use crate::parse::ast::Evaluate;
use crate::parse::{parse, ExpressionTree};

/// The outcome of evaluating an expression tree once.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RollResult {
    formula: String,
    #[serde(skip)]
    tree: ExpressionTree,
    dice: Vec<DiceOutcome>,
    total: Number,
    is_deterministic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    flavor: Option<String>,
}

impl RollResult {
    /// The evaluated formula, recompiled from the tree.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn tree(&self) -> &ExpressionTree {
        &self.tree
    }

    /// One outcome per dice term, in the order the terms appear.
    pub fn dice(&self) -> &[DiceOutcome] {
        &self.dice
    }

    pub fn total(&self) -> Number {
        self.total
    }

    pub fn is_deterministic(&self) -> bool {
        self.is_deterministic
    }

    pub fn flavor(&self) -> Option<&str> {
        self.flavor.as_deref()
    }

    /// Every die drawn, across all terms.
    pub fn rolls(&self) -> Vec<Int> {
        self.dice.iter().flat_map(|d| d.rolls().iter().copied()).collect()
    }

    /// Every die that counted towards the total, across all terms.
    pub fn retained(&self) -> Vec<Int> {
        self.dice.iter().flat_map(|d| d.retained().iter().copied()).collect()
    }
}

/// Evaluates `tree`, drawing dice from `rng`.
///
/// Multiplication and division bind tighter than addition and subtraction, and operators of
/// equal precedence apply left to right. Trees without dice never consult `rng`.
pub fn evaluate<R: RandomSource>(tree: &ExpressionTree, rng: &mut R) -> RollResult {
    let mut ctx = RollContext::new(rng);
    let total = tree.root().evaluate(&mut ctx);
    let dice = ctx.into_outcomes();

    tracing::debug!(formula = %tree, %total, dice = dice.len(), "evaluated roll");
    RollResult {
        formula: tree.to_string(),
        tree: tree.clone(),
        is_deterministic: dice.is_empty(),
        dice,
        total,
        flavor: None,
    }
}

/// Evaluates a tree that rolls no dice. Returns `None` if it does.
pub fn evaluate_deterministic(tree: &ExpressionTree) -> Option<RollResult> {
    if !tree.is_deterministic() {
        return None;
    }
    Some(evaluate(tree, &mut ScriptedSource::default()))
}

/// A formula bound to its data and roll options.
///
/// Every `with_*` call returns a new session with its tree rebuilt. Evaluating a session never
/// changes it, so the same session can be rolled any number of times. The check die is only
/// rewritten once a mode is set, so a formula without one rolls exactly as written.
#[derive(Debug, Clone)]
pub struct RollSession {
    formula: String,
    bindings: Bindings,
    bonuses: Vec<String>,
    mode: Option<AdvantageMode>,
    elven_accuracy: bool,
    flavor: Option<String>,
    aptitude: Option<Aptitude>,
    config: RollConfig,
    tree: ExpressionTree,
}

impl RollSession {
    pub fn new(formula: impl Into<String>, bindings: Bindings) -> RResult<Self> {
        let formula = formula.into();
        let tree = parse(&formula, &bindings)?;
        let config = RollConfig::default();
        check_dice_count(&tree, &config)?;

        Ok(Self {
            formula,
            bindings,
            bonuses: Vec::new(),
            mode: None,
            elven_accuracy: false,
            flavor: None,
            aptitude: None,
            config,
            tree,
        })
    }

    pub fn with_mode(mut self, mode: AdvantageMode, elven_accuracy: bool) -> RResult<Self> {
        self.mode = Some(mode);
        self.elven_accuracy = elven_accuracy;
        self.rebuild()
    }

    /// Applies the dice limit, labels and elven accuracy of `config`, and its default mode when
    /// it has one.
    pub fn with_config(mut self, config: &RollConfig) -> RResult<Self> {
        self.config = config.clone();
        if config.default_mode.is_some() {
            self.mode = config.default_mode;
        }
        self.elven_accuracy = config.elven_accuracy;
        self.rebuild()
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    /// Appends a situational bonus formula.
    pub fn with_bonus(mut self, bonus: impl Into<String>) -> RResult<Self> {
        self.bonuses.push(bonus.into());
        self.rebuild()
    }

    /// Turns the session into a check of `aptitude`.
    ///
    /// The aptitude's modifier (`@aptitudes.<key>.mod`, zero when absent) is bound to `@mod` and
    /// added to the formula.
    pub fn with_aptitude(mut self, aptitude: Aptitude) -> RResult<Self> {
        let modifier = self
            .bindings
            .get(&aptitude.modifier_path())
            .cloned()
            .unwrap_or(Binding::Int(0));
        self.bindings.insert("mod", modifier);
        self.bonuses.push("@mod".to_string());
        self.aptitude = Some(aptitude);
        self.rebuild()
    }

    pub fn tree(&self) -> &ExpressionTree {
        &self.tree
    }

    /// The mode the check die was resolved for, if any.
    pub fn mode(&self) -> Option<AdvantageMode> {
        self.mode
    }

    pub fn is_deterministic(&self) -> bool {
        self.tree.is_deterministic()
    }

    /// The roll's flavor text with the advantage label appended, e.g. `"Might Check (Edge)"`.
    pub fn flavor(&self) -> Option<String> {
        let label = |key: &str| self.config.label(key);
        let base = self.flavor.clone().or_else(|| {
            self.aptitude.map(|apt| {
                label("BREAK.AptitudePromptTitle").replace("{aptitude}", &label(apt.label_key()))
            })
        })?;
        Some(self.mode.unwrap_or_default().flavor(&base, label))
    }

    pub fn evaluate<R: RandomSource>(&self, rng: &mut R) -> RollResult {
        RollResult {
            flavor: self.flavor(),
            ..evaluate(&self.tree, rng)
        }
    }

    fn rebuild(mut self) -> RResult<Self> {
        let mut tree = parse(&self.formula, &self.bindings)?;
        for bonus in &self.bonuses {
            tree = append_bonus(&tree, bonus, &self.bindings)?;
        }
        if let Some(mode) = self.mode {
            tree = resolve(&tree, mode, self.elven_accuracy)?;
        }
        check_dice_count(&tree, &self.config)?;
        self.tree = tree;
        Ok(self)
    }
}

fn check_dice_count(tree: &ExpressionTree, config: &RollConfig) -> RResult<()> {
    let requested = tree.dice_count();
    if requested > config.max_dice {
        return Err(RollError::TooManyDice {
            requested,
            max: config.max_dice,
        });
    }
    Ok(())
}
