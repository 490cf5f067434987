use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One finished season from a club's point of view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub season: u32,
    #[serde(default)]
    pub league_position: Option<u32>,
    #[serde(default)]
    pub cup_result: Option<String>,
}

/// Per-club season history, keyed by club name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStore {
    #[serde(default)]
    records: HashMap<String, Vec<SeasonRecord>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        HistoryStore::default()
    }

    pub fn add_record(&mut self, club_name: impl Into<String>, record: SeasonRecord) {
        self.records.entry(club_name.into()).or_default().push(record);
    }

    pub fn last_record(&self, club_name: &str) -> Option<&SeasonRecord> {
        self.records.get(club_name).and_then(|list| list.last())
    }

    pub fn all_for(&self, club_name: &str) -> &[SeasonRecord] {
        self.records
            .get(club_name)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn snapshot(&self) -> &HashMap<String, Vec<SeasonRecord>> {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_append_per_club() {
        let mut store = HistoryStore::new();
        store.add_record(
            "Alfa",
            SeasonRecord {
                season: 1,
                league_position: Some(2),
                cup_result: None,
            },
        );
        store.add_record(
            "Alfa",
            SeasonRecord {
                season: 2,
                league_position: Some(1),
                cup_result: Some("Winner".to_string()),
            },
        );

        assert_eq!(store.all_for("Alfa").len(), 2);
        assert_eq!(store.last_record("Alfa").unwrap().season, 2);
        assert!(store.all_for("Beta").is_empty());
    }
}
