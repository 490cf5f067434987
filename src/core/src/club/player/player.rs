use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    GK,
    DF,
    MF,
    FW,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::GK, Position::DF, Position::MF, Position::FW];

    pub fn parse(value: &str) -> Option<Position> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GK" => Some(Position::GK),
            "DF" => Some(Position::DF),
            "MF" => Some(Position::MF),
            "FW" => Some(Position::FW),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DF => "DF",
            Position::MF => "MF",
            Position::FW => "FW",
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed trait enumeration. Unknown names in a save file are dropped
/// silently on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Leader,
    Intelligent,
    Fast,
    Stamina,
    Aggressive,
    PenaltySpec,
    FreekickSpec,
    Trainable,
    InjuryProne,
    Inconsistent,
    CardProne,
}

impl Trait {
    pub const ALL: [Trait; 11] = [
        Trait::Leader,
        Trait::Intelligent,
        Trait::Fast,
        Trait::Stamina,
        Trait::Aggressive,
        Trait::PenaltySpec,
        Trait::FreekickSpec,
        Trait::Trainable,
        Trait::InjuryProne,
        Trait::Inconsistent,
        Trait::CardProne,
    ];

    pub fn parse(value: &str) -> Option<Trait> {
        match value.trim() {
            "Leader" => Some(Trait::Leader),
            "Intelligent" => Some(Trait::Intelligent),
            "Fast" => Some(Trait::Fast),
            "Stamina" => Some(Trait::Stamina),
            "Aggressive" => Some(Trait::Aggressive),
            "PenaltySpec" => Some(Trait::PenaltySpec),
            "FreekickSpec" => Some(Trait::FreekickSpec),
            "Trainable" => Some(Trait::Trainable),
            "InjuryProne" => Some(Trait::InjuryProne),
            "Inconsistent" => Some(Trait::Inconsistent),
            "CardProne" => Some(Trait::CardProne),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub position: Position,
    pub number: u8,

    /// Visible rating, 1-30.
    pub skill_open: u8,
    /// Internal progression pool, 1-99.
    pub skill_hidden: u8,

    /// Form 1-20.
    pub form_now: u8,
    /// Season form 1-20, drifts toward 10.
    pub form_season: f32,

    pub traits: Vec<Trait>,
    pub value_sek: i64,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn has_trait(&self, wanted: Trait) -> bool {
        self.traits.contains(&wanted)
    }
}

/// Accepts the legacy on-disk shape: missing fields get defaults,
/// `skill_hidden` falls back to the old `skill_xp` pool, unknown positions
/// default to MF and unknown traits are dropped.
#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default = "default_age")]
    age: u8,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    number: Option<u8>,
    #[serde(default)]
    jersey_number: Option<u8>,
    #[serde(default)]
    skill_open: Option<u8>,
    #[serde(default)]
    skill_hidden: Option<u8>,
    #[serde(default)]
    skill_xp: Option<u8>,
    #[serde(default)]
    form_now: Option<u8>,
    #[serde(default)]
    form_season: Option<f32>,
    #[serde(default)]
    traits: Vec<String>,
    #[serde(default)]
    value_sek: i64,
}

fn default_age() -> u8 {
    22
}

impl<'de> Deserialize<'de> for Player {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawPlayer::deserialize(deserializer)?;

        let position = raw
            .position
            .as_deref()
            .and_then(Position::parse)
            .unwrap_or(Position::MF);

        let traits = raw
            .traits
            .iter()
            .filter_map(|name| Trait::parse(name))
            .collect();

        Ok(Player {
            id: raw.id,
            first_name: raw.first_name,
            last_name: raw.last_name,
            age: raw.age,
            position,
            number: raw.number.or(raw.jersey_number).unwrap_or(0),
            skill_open: raw.skill_open.unwrap_or(5).clamp(1, 30),
            skill_hidden: raw.skill_hidden.or(raw.skill_xp).unwrap_or(50).clamp(1, 99),
            form_now: raw.form_now.unwrap_or(10).clamp(1, 20),
            form_season: raw.form_season.unwrap_or(10.0).clamp(1.0, 20.0),
            traits,
            value_sek: raw.value_sek,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Player {
        Player {
            id: 9,
            first_name: "Kalle".into(),
            last_name: "Berg".into(),
            age: 24,
            position: Position::FW,
            number: 9,
            skill_open: 7,
            skill_hidden: 55,
            form_now: 10,
            form_season: 10.0,
            traits: vec![Trait::Fast, Trait::PenaltySpec],
            value_sek: 2_800_000,
        }
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let player = sample();
        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, player.id);
        assert_eq!(back.position, Position::FW);
        assert_eq!(back.skill_hidden, 55);
        assert_eq!(back.traits, player.traits);
    }

    #[test]
    fn legacy_skill_xp_is_used_when_hidden_missing() {
        let json = r#"{
            "id": 1, "first_name": "A", "last_name": "B", "age": 20,
            "position": "DF", "number": 4, "skill_open": 6, "skill_xp": 77
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.skill_hidden, 77);
    }

    #[test]
    fn unknown_traits_and_position_are_tolerated() {
        let json = r#"{
            "id": 2, "first_name": "C", "last_name": "D", "age": 21,
            "position": "LIBERO", "number": 5,
            "traits": ["Leader", "MYSTERY", "Fast"]
        }"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.position, Position::MF);
        assert_eq!(player.traits, vec![Trait::Leader, Trait::Fast]);
        assert_eq!(player.skill_hidden, 50);
    }

    #[test]
    fn jersey_number_alias_is_accepted() {
        let json = r#"{"id": 3, "first_name": "E", "last_name": "F", "age": 19,
                       "position": "GK", "jersey_number": 1}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.number, 1);
    }
}
