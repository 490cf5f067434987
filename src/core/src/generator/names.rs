use crate::utils::GameRng;

/// Embedded default name material. An asset loader may hand in its own
/// lists through `NameBank::new`; the engine only ever reads through this
/// interface.
pub struct NameBank {
    first_names: Vec<String>,
    last_names: Vec<String>,
    team_names: Vec<String>,
}

const FIRST_NAMES: [&str; 32] = [
    "Erik", "Lars", "Karl", "Anders", "Johan", "Per", "Nils", "Jan", "Gustav", "Olof", "Mats",
    "Henrik", "Fredrik", "Magnus", "Björn", "Stefan", "Mikael", "Tomas", "Jonas", "Patrik",
    "Marcus", "Oskar", "Viktor", "Emil", "Axel", "Hugo", "Elias", "Isak", "Filip", "Anton",
    "Rasmus", "Albin",
];

const LAST_NAMES: [&str; 32] = [
    "Andersson", "Johansson", "Karlsson", "Nilsson", "Eriksson", "Larsson", "Olsson", "Persson",
    "Svensson", "Gustafsson", "Pettersson", "Jonsson", "Jansson", "Hansson", "Bengtsson",
    "Jönsson", "Lindberg", "Jakobsson", "Magnusson", "Olofsson", "Lindström", "Lindqvist",
    "Lindgren", "Berg", "Axelsson", "Bergström", "Lundberg", "Lundgren", "Lind", "Berglund",
    "Fransson", "Sandberg",
];

const TEAM_NAMES: [&str; 24] = [
    "Norrby IK", "Söderhamns FF", "Västerviks BK", "Österlens SK", "Kullens IF", "Havsbadens AIF",
    "Bergslagens BK", "Dalhems IF", "Strandvallens SK", "Åkerby FF", "Granlunda IS", "Björkhagens IF",
    "Sjöstadens BK", "Forsens IK", "Tallmons SK", "Ekhagens FF", "Vikafjärdens IF", "Lundaslättens SK",
    "Malmhamra IF", "Stenbrottets BK", "Kvarnby AIS", "Hedängens IF", "Timmerdalens SK", "Fyrbodals FF",
];

impl Default for NameBank {
    fn default() -> Self {
        NameBank {
            first_names: FIRST_NAMES.iter().map(|s| s.to_string()).collect(),
            last_names: LAST_NAMES.iter().map(|s| s.to_string()).collect(),
            team_names: TEAM_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NameBank {
    pub fn new(first_names: Vec<String>, last_names: Vec<String>, team_names: Vec<String>) -> Self {
        let defaults = NameBank::default();
        NameBank {
            first_names: if first_names.is_empty() {
                defaults.first_names
            } else {
                first_names
            },
            last_names: if last_names.is_empty() {
                defaults.last_names
            } else {
                last_names
            },
            team_names: if team_names.is_empty() {
                defaults.team_names
            } else {
                team_names
            },
        }
    }

    pub fn first_name(&self, rng: &mut GameRng) -> String {
        rng.pick(&self.first_names).cloned().unwrap_or_else(|| "Förnamn".to_string())
    }

    pub fn last_name(&self, rng: &mut GameRng) -> String {
        rng.pick(&self.last_names).cloned().unwrap_or_else(|| "Efternamn".to_string())
    }

    /// `count` unique team names, recycling with numeric suffixes when the
    /// bank runs dry.
    pub fn team_names(&self, count: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(count);
        let mut index = 0;
        while names.len() < count {
            let base = &self.team_names[index % self.team_names.len()];
            let round = index / self.team_names.len();
            if round == 0 {
                names.push(base.clone());
            } else {
                names.push(format!("{} {}", base, round + 1));
            }
            index += 1;
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_names_are_unique_even_beyond_the_bank() {
        let bank = NameBank::default();
        let names = bank.team_names(50);
        let unique: std::collections::HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn empty_custom_lists_fall_back_to_defaults() {
        let bank = NameBank::new(vec![], vec!["Ek".to_string()], vec![]);
        let mut rng = GameRng::seeded(1);
        assert!(!bank.first_name(&mut rng).is_empty());
        assert_eq!(bank.last_name(&mut rng), "Ek");
    }
}
