use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchEventKind {
    Goal,
    PenaltyScored,
    PenaltyMissed,
    Yellow,
    Red,
    Substitution,
    Injury,
    Offside,
}

impl MatchEventKind {
    /// Contract-facing slug for the event type.
    pub fn slug(&self) -> &'static str {
        match self {
            MatchEventKind::Goal => "goal",
            MatchEventKind::PenaltyScored => "pen_scored",
            MatchEventKind::PenaltyMissed => "pen_missed",
            MatchEventKind::Yellow => "yc",
            MatchEventKind::Red => "rc",
            MatchEventKind::Substitution => "sub",
            MatchEventKind::Injury => "injury",
            MatchEventKind::Offside => "offside",
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, MatchEventKind::Goal | MatchEventKind::PenaltyScored)
    }
}

/// One timeline entry. For substitutions `player_id` is the player coming
/// on and `assist_id` the player going off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
    pub minute: u8,
    #[serde(rename = "type")]
    pub kind: MatchEventKind,
    #[serde(default)]
    pub player_id: Option<u32>,
    #[serde(default)]
    pub assist_id: Option<u32>,
    #[serde(default)]
    pub note: Option<String>,
}

impl MatchEvent {
    pub fn new(minute: u8, kind: MatchEventKind, player_id: Option<u32>) -> Self {
        MatchEvent {
            minute,
            kind,
            player_id,
            assist_id: None,
            note: None,
        }
    }

    pub fn with_assist(mut self, assist_id: Option<u32>) -> Self {
        self.assist_id = assist_id;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serialises_as_screaming_snake_case() {
        let json = serde_json::to_string(&MatchEventKind::PenaltyScored).unwrap();
        assert_eq!(json, r#""PENALTY_SCORED""#);
    }

    #[test]
    fn event_round_trips() {
        let event = MatchEvent::new(45, MatchEventKind::Goal, Some(7)).with_assist(Some(10));
        let json = serde_json::to_string(&event).unwrap();
        let back: MatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.minute, 45);
        assert_eq!(back.kind, MatchEventKind::Goal);
        assert_eq!(back.player_id, Some(7));
        assert_eq!(back.assist_id, Some(10));
    }
}
