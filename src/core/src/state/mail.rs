use serde::{Deserialize, Serialize};

/// Inbox entry shown to the user. Append-only within a career.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_unread")]
    pub unread: bool,
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub week: u32,
}

fn default_unread() -> bool {
    true
}

impl MailMessage {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        season: u32,
        week: u32,
    ) -> Self {
        MailMessage {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
            unread: true,
            season,
            week,
        }
    }
}
