use crate::club::player::Position;
use serde::{Deserialize, Serialize};

/// Persistent per-club tactic flags plus tempo (0.8-1.2 typical).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tactic {
    #[serde(default)]
    pub attacking: bool,
    #[serde(default)]
    pub defending: bool,
    #[serde(default)]
    pub offside_trap: bool,
    #[serde(default)]
    pub dark_arts: bool,
    #[serde(default = "default_tempo")]
    pub tempo: f32,
}

fn default_tempo() -> f32 {
    1.0
}

impl Default for Tactic {
    fn default() -> Self {
        Tactic {
            attacking: false,
            defending: false,
            offside_trap: false,
            dark_arts: false,
            tempo: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Aggressiveness {
    Calm,
    #[default]
    Medium,
    Aggressive,
}

impl Aggressiveness {
    /// (offensive multiplier, card multiplier). Calm trades a sliver of
    /// attack for fewer cards, Aggressive the opposite.
    pub fn modifiers(&self) -> (f64, f64) {
        match self {
            Aggressiveness::Calm => (0.99, 0.85),
            Aggressiveness::Medium => (1.00, 1.00),
            Aggressiveness::Aggressive => (1.02, 1.20),
        }
    }

    pub fn card_factor(&self) -> f64 {
        self.modifiers().1
    }

    pub fn offensive_factor(&self) -> f64 {
        self.modifiers().0
    }

    pub fn parse(value: &str) -> Option<Aggressiveness> {
        match value.trim() {
            "Calm" => Some(Aggressiveness::Calm),
            "Medium" => Some(Aggressiveness::Medium),
            "Aggressive" => Some(Aggressiveness::Aggressive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggressiveness::Calm => "Calm",
            Aggressiveness::Medium => "Medium",
            Aggressiveness::Aggressive => "Aggressive",
        }
    }
}

/// One entry of a club's substitution plan. A rule with `on_injury` only
/// fires when a starter goes down; the others fire at their minute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub minute: u8,
    #[serde(default)]
    pub player_in: Option<u32>,
    #[serde(default)]
    pub player_out: Option<u32>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub on_injury: bool,
}

impl SubstitutionRule {
    pub fn planned(minute: u8, player_in: u32, player_out: u32) -> Self {
        SubstitutionRule {
            minute,
            player_in: Some(player_in),
            player_out: Some(player_out),
            position: None,
            on_injury: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggressiveness_modifiers_are_monotonic_in_cards() {
        assert!(Aggressiveness::Calm.card_factor() < Aggressiveness::Medium.card_factor());
        assert!(Aggressiveness::Medium.card_factor() < Aggressiveness::Aggressive.card_factor());
    }

    #[test]
    fn tactic_defaults_to_neutral_tempo() {
        let tactic = Tactic::default();
        assert_eq!(tactic.tempo, 1.0);
        assert!(!tactic.attacking && !tactic.defending);
    }

    #[test]
    fn tactic_tolerates_missing_fields_on_load() {
        let tactic: Tactic = serde_json::from_str(r#"{"attacking": true}"#).unwrap();
        assert!(tactic.attacking);
        assert_eq!(tactic.tempo, 1.0);
    }
}
