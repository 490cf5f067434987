use serde::{Deserialize, Serialize};

/// Fallback pool used when a fixture arrives without an assigned official.
const REFEREE_NAMES: [&str; 10] = [
    "Stefan Lund",
    "Pernilla Åkesson",
    "Jonas Ek",
    "Mikael Strand",
    "Anders Hedlund",
    "Sara Lindqvist",
    "Peter Månsson",
    "Erik Dahl",
    "Magnus Sjöberg",
    "Johan Wiklund",
];

/// Match official. `skill` drives detection quality, `hardness` the card
/// tendency, both on 1-10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referee {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_skill")]
    pub skill: u8,
    #[serde(default = "default_hardness")]
    pub hardness: u8,
}

fn default_skill() -> u8 {
    6
}

fn default_hardness() -> u8 {
    5
}

impl Default for Referee {
    fn default() -> Self {
        Referee {
            name: String::new(),
            skill: 6,
            hardness: 5,
        }
    }
}

impl Referee {
    pub fn new(name: impl Into<String>, skill: u8, hardness: u8) -> Self {
        Referee {
            name: name.into(),
            skill: skill.clamp(1, 10),
            hardness: hardness.clamp(1, 10),
        }
    }

    /// Deterministic name resolution: a blank name picks from the fixed
    /// pool via a fold over the concatenated club names.
    pub fn resolved(&self, home: &str, away: &str) -> Referee {
        if !self.name.trim().is_empty() {
            return self.clone();
        }
        let mut hash: u64 = 0;
        for byte in home.bytes().chain(away.bytes()) {
            hash = hash.wrapping_mul(31).wrapping_add(byte as u64);
        }
        let name = REFEREE_NAMES[(hash % REFEREE_NAMES.len() as u64) as usize];
        Referee {
            name: name.to_string(),
            skill: self.skill,
            hardness: self.hardness,
        }
    }

    /// Detection quality around 1.0 for an average official.
    pub fn detection_factor(&self) -> f64 {
        1.0 + 0.12 * ((self.skill as f64 - 5.0) / 5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_resolves_deterministically() {
        let referee = Referee::default();
        let a = referee.resolved("Alfa", "Beta");
        let b = referee.resolved("Alfa", "Beta");
        assert_eq!(a.name, b.name);
        assert!(!a.name.is_empty());
    }

    #[test]
    fn explicit_name_is_kept() {
        let referee = Referee::new("Egen Domare", 8, 4);
        assert_eq!(referee.resolved("A", "B").name, "Egen Domare");
    }

    #[test]
    fn detection_scales_with_skill() {
        assert!(Referee::new("x", 10, 5).detection_factor() > Referee::new("x", 1, 5).detection_factor());
    }
}
