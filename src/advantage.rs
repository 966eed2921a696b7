//! Advantage and disadvantage on the check die.

use crate::common::*;
use crate::error::{RResult, RollError};
use crate::parse::ExpressionTree;
use std::fmt;
use std::str::FromStr;

/// Which of the check die's rolls count. Hosts label advantage *Edge* and disadvantage *Snag*.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvantageMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl AdvantageMode {
    /// Converts the host's numeric mode: positive is advantage, negative disadvantage.
    pub fn from_adv_mode(value: Int) -> Self {
        match value.signum() {
            1 => Self::Advantage,
            -1 => Self::Disadvantage,
            _ => Self::Normal,
        }
    }

    pub fn adv_mode(self) -> Int {
        match self {
            Self::Normal => 0,
            Self::Advantage => 1,
            Self::Disadvantage => -1,
        }
    }

    /// Localization key of the mode's label. `Normal` has none.
    pub fn label_key(self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Advantage => Some("BREAK.Edge"),
            Self::Disadvantage => Some("BREAK.Snag"),
        }
    }

    /// Appends the mode's label to `base`, e.g. `"Might Check (Edge)"`.
    pub fn flavor(self, base: &str, label: impl Fn(&str) -> String) -> String {
        match self.label_key() {
            Some(key) => format!("{} ({})", base, label(key)),
            None => base.to_owned(),
        }
    }
}

impl FromStr for AdvantageMode {
    type Err = RollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "none" | "0" => Ok(Self::Normal),
            "advantage" | "adv" | "edge" | "1" => Ok(Self::Advantage),
            "disadvantage" | "dis" | "snag" | "-1" => Ok(Self::Disadvantage),
            _ => Err(RollError::Config(format!("unknown advantage mode {:?}", s))),
        }
    }
}

impl fmt::Display for AdvantageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Advantage => "advantage",
            Self::Disadvantage => "disadvantage",
        })
    }
}

/// Reconfigures the check die (the first d20) for `mode`, returning a new tree.
///
/// Any modifiers already on the check die are replaced. A tree without a d20 is returned as
/// is under [`AdvantageMode::Normal`] and rejected with [`RollError::NoCheckDie`] otherwise.
pub fn resolve(
    tree: &ExpressionTree,
    mode: AdvantageMode,
    elven_accuracy: bool,
) -> RResult<ExpressionTree> {
    let mut ret = tree.clone();
    let Some(die) = ret.check_die_mut() else {
        return match mode {
            AdvantageMode::Normal => Ok(ret),
            _ => Err(RollError::NoCheckDie),
        };
    };

    let (count, modifiers) = match mode {
        AdvantageMode::Normal => (1, vec![]),
        AdvantageMode::Advantage if elven_accuracy => (3, vec![Modifier::KeepHighest(1)]),
        AdvantageMode::Advantage => (2, vec![Modifier::KeepHighest(1)]),
        AdvantageMode::Disadvantage => (2, vec![Modifier::KeepLowest(1)]),
    };
    die.configure(count, modifiers);

    tracing::trace!(%mode, elven_accuracy, tree = %ret, "resolved check die");
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::parse::parse;
    use proptest::prelude::*;

    fn resolved(s: &str, mode: AdvantageMode, elven_accuracy: bool) -> RResult<String> {
        let tree = parse(s, &Bindings::new()).unwrap();
        resolve(&tree, mode, elven_accuracy).map(|t| t.to_string())
    }

    #[test]
    fn test_resolve_modes() {
        use AdvantageMode::*;
        assert_eq!(resolved("1d20 + 3", Advantage, false).unwrap(), "2d20kh1 + 3");
        assert_eq!(resolved("1d20 + 3", Advantage, true).unwrap(), "3d20kh1 + 3");
        assert_eq!(resolved("1d20 + 3", Disadvantage, true).unwrap(), "2d20kl1 + 3");
        assert_eq!(resolved("2d20kh1 + 3", Normal, false).unwrap(), "1d20 + 3");
    }

    #[test]
    fn test_resolve_only_touches_first_d20() {
        let s = "1d6 + 1d20 + 1d20";
        assert_eq!(
            resolved(s, AdvantageMode::Advantage, false).unwrap(),
            "1d6 + 2d20kh1 + 1d20"
        );
    }

    #[test]
    fn test_resolve_replaces_modifiers() {
        assert_eq!(
            resolved("4d20kl2", AdvantageMode::Advantage, false).unwrap(),
            "2d20kh1"
        );
    }

    #[test]
    fn test_resolve_without_check_die() {
        assert_eq!(
            resolved("1d6 + 2", AdvantageMode::Advantage, false),
            Err(RollError::NoCheckDie)
        );
        assert_eq!(
            resolved("1d6 + 2", AdvantageMode::Disadvantage, false),
            Err(RollError::NoCheckDie)
        );
        assert_eq!(resolved("1d6 + 2", AdvantageMode::Normal, false).unwrap(), "1d6 + 2");
    }

    #[test]
    fn test_resolve_leaves_input_alone() {
        let tree = parse("1d20", &Bindings::new()).unwrap();
        let _ = resolve(&tree, AdvantageMode::Advantage, true).unwrap();
        assert_eq!(tree.to_string(), "1d20");
    }

    #[test]
    fn test_mode_conversions() {
        assert_eq!(AdvantageMode::from_adv_mode(1), AdvantageMode::Advantage);
        assert_eq!(AdvantageMode::from_adv_mode(0), AdvantageMode::Normal);
        assert_eq!(AdvantageMode::from_adv_mode(-1), AdvantageMode::Disadvantage);
        assert_eq!("edge".parse::<AdvantageMode>().unwrap(), AdvantageMode::Advantage);
        assert_eq!("DIS".parse::<AdvantageMode>().unwrap(), AdvantageMode::Disadvantage);
        assert!("sideways".parse::<AdvantageMode>().is_err());
        for mode in [AdvantageMode::Normal, AdvantageMode::Advantage, AdvantageMode::Disadvantage] {
            assert_eq!(AdvantageMode::from_adv_mode(mode.adv_mode()), mode);
            assert_eq!(mode.to_string().parse::<AdvantageMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_flavor() {
        let label = |key: &str| key.trim_start_matches("BREAK.").to_string();
        assert_eq!(AdvantageMode::Advantage.flavor("Might Check", label), "Might Check (Edge)");
        assert_eq!(AdvantageMode::Disadvantage.flavor("Attack", label), "Attack (Snag)");
        assert_eq!(AdvantageMode::Normal.flavor("Attack", label), "Attack");
    }

    fn any_mode() -> impl Strategy<Value = AdvantageMode> {
        prop_oneof![
            Just(AdvantageMode::Normal),
            Just(AdvantageMode::Advantage),
            Just(AdvantageMode::Disadvantage),
        ]
    }

    proptest! {
        #[test]
        fn prop_normal_undoes_any_mode(mode in any_mode(), elven in any::<bool>(), bonus in -20i64..20) {
            let tree = parse(&format!("1d20 + {}", bonus), &Bindings::new()).unwrap();
            let direct = resolve(&tree, AdvantageMode::Normal, elven).unwrap();
            let via = resolve(&resolve(&tree, mode, elven).unwrap(), AdvantageMode::Normal, elven).unwrap();
            prop_assert_eq!(direct, via);
        }

        #[test]
        fn prop_resolve_is_idempotent(mode in any_mode(), elven in any::<bool>()) {
            let tree = parse("1d20 + 1d4", &Bindings::new()).unwrap();
            let once = resolve(&tree, mode, elven).unwrap();
            let twice = resolve(&once, mode, elven).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
