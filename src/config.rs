//! Roll settings, loadable from a TOML file.
//!
//! ```toml
//! max_dice = 200
//! elven_accuracy = true
//! default_mode = "advantage"
//!
//! [labels]
//! "BREAK.Edge" = "Boon"
//! ```

use crate::advantage::AdvantageMode;
use crate::aptitude::Aptitude;
use crate::common::Count;
use crate::error::{RResult, RollError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_DICE: Count = 1000;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct RollConfig {
    /// Upper bound on the dice a single roll may draw.
    pub max_dice: Count,
    pub elven_accuracy: bool,
    /// Mode applied to every roll. Without one, formulas roll as written.
    pub default_mode: Option<AdvantageMode>,
    /// Display text by localization key. Keys missing here fall back to the built-in labels.
    pub labels: HashMap<String, String>,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            max_dice: DEFAULT_MAX_DICE,
            elven_accuracy: false,
            default_mode: None,
            labels: HashMap::new(),
        }
    }
}

impl RollConfig {
    pub fn from_toml_str(s: &str) -> RResult<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| RollError::Config(format!("failed to parse roll config: {}", e)))?;
        if config.max_dice == 0 {
            return Err(RollError::Config("max_dice must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> RResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| RollError::Config(format!("failed to read {:?}: {}", path, e)))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(?path, max_dice = config.max_dice, "loaded roll config");
        Ok(config)
    }

    /// The display text for `key`. Unknown keys are returned as is.
    pub fn label(&self, key: &str) -> String {
        if let Some(label) = self.labels.get(key) {
            return label.clone();
        }
        default_label(key).unwrap_or(key).to_owned()
    }
}

fn default_label(key: &str) -> Option<&'static str> {
    let aptitude = Aptitude::ALL.into_iter().find(|apt| apt.label_key() == key);
    if let Some(apt) = aptitude {
        return Some(match apt {
            Aptitude::Might => "Might",
            Aptitude::Deft => "Deft",
            Aptitude::Grit => "Grit",
            Aptitude::Insight => "Insight",
            Aptitude::Aura => "Aura",
        });
    }

    Some(match key {
        "BREAK.Edge" => "Edge",
        "BREAK.Snag" => "Snag",
        "BREAK.Normal" => "Normal",
        "BREAK.AptitudePromptTitle" => "{aptitude} Check",
        "BREAK.AptitudeMightAbbr" => "MGT",
        "BREAK.AptitudeDeftAbbr" => "DFT",
        "BREAK.AptitudeGritAbbr" => "GRT",
        "BREAK.AptitudeInsightAbbr" => "INS",
        "BREAK.AptitudeAuraAbbr" => "AUR",
        _ => return None,
    })
}
