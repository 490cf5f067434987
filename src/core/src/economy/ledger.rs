use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LedgerDate {
    pub season: u32,
    pub week: u32,
}

/// Append-only economy ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: LedgerDate,
    #[serde(default)]
    pub club_id: Option<String>,
    pub club: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub amount: i64,
}

impl LedgerEntry {
    pub fn income(
        date: LedgerDate,
        club_id: Option<String>,
        club: impl Into<String>,
        label: impl Into<String>,
        amount: i64,
    ) -> Self {
        LedgerEntry {
            date,
            club_id,
            club: club.into(),
            kind: "income".to_string(),
            label: label.into(),
            amount,
        }
    }

    pub fn expense(
        date: LedgerDate,
        club_id: Option<String>,
        club: impl Into<String>,
        label: impl Into<String>,
        amount: i64,
    ) -> Self {
        LedgerEntry {
            date,
            club_id,
            club: club.into(),
            kind: "expense".to_string(),
            label: label.into(),
            amount,
        }
    }
}
