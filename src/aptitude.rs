use crate::error::RollError;
use std::fmt;
use std::str::FromStr;

/// One of the five aptitude scores a character rolls checks against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aptitude {
    Might,
    Deft,
    Grit,
    Insight,
    Aura,
}

impl Aptitude {
    pub const ALL: [Self; 5] = [Self::Might, Self::Deft, Self::Grit, Self::Insight, Self::Aura];

    /// Key under `aptitudes` in actor data.
    pub fn key(self) -> &'static str {
        match self {
            Self::Might => "might",
            Self::Deft => "deft",
            Self::Grit => "grit",
            Self::Insight => "insight",
            Self::Aura => "aura",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Self::Might => "BREAK.AptitudeMight",
            Self::Deft => "BREAK.AptitudeDeft",
            Self::Grit => "BREAK.AptitudeGrit",
            Self::Insight => "BREAK.AptitudeInsight",
            Self::Aura => "BREAK.AptitudeAura",
        }
    }

    pub fn abbreviation_key(self) -> &'static str {
        match self {
            Self::Might => "BREAK.AptitudeMightAbbr",
            Self::Deft => "BREAK.AptitudeDeftAbbr",
            Self::Grit => "BREAK.AptitudeGritAbbr",
            Self::Insight => "BREAK.AptitudeInsightAbbr",
            Self::Aura => "BREAK.AptitudeAuraAbbr",
        }
    }

    /// Binding path of the aptitude's modifier, e.g. `aptitudes.might.mod`.
    pub fn modifier_path(self) -> String {
        format!("aptitudes.{}.mod", self.key())
    }
}

impl FromStr for Aptitude {
    type Err = RollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|apt| apt.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| RollError::Config(format!("unknown aptitude {:?}", s)))
    }
}

impl fmt::Display for Aptitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
