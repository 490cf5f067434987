use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct CareerEntry {
    pub career_id: String,
    pub name: String,
    pub season: Option<u32>,
    pub team_id: Option<String>,
    pub path: String,
}

/// Enumerates save files and resolves career ids to paths.
pub struct CareerManager<'c> {
    context: &'c ServiceContext,
}

impl<'c> CareerManager<'c> {
    pub fn new(context: &'c ServiceContext) -> Self {
        CareerManager { context }
    }

    pub fn list_careers(&self) -> Vec<CareerEntry> {
        let mut entries = Vec::new();

        if self.context.flags.mock_mode {
            entries.push(CareerEntry {
                career_id: self.context.flags.mock_career_id.clone(),
                name: "Demo-karriär".to_string(),
                season: Some(1),
                team_id: None,
                path: self.context.file_path.display().to_string(),
            });
        }

        let Ok(dir) = fs::read_dir(&self.context.saves_dir) else {
            return entries;
        };
        let mut files: Vec<PathBuf> = dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        files.sort();

        for file in files {
            let Ok(raw) = fs::read_to_string(&file) else {
                continue;
            };
            let Ok(data) = serde_json::from_str::<Value>(&raw) else {
                continue;
            };
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let meta = data.get("meta").cloned().unwrap_or(Value::Null);
            entries.push(CareerEntry {
                career_id: meta
                    .get("career_id")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| stem.clone()),
                name: meta
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
                    .unwrap_or(stem),
                season: data.get("season").and_then(Value::as_u64).map(|s| s as u32),
                team_id: meta
                    .get("user_team_id")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
                path: file.display().to_string(),
            });
        }
        entries
    }

    pub fn resolve(&self, career_id: &str) -> ServiceResult<PathBuf> {
        if self.context.flags.mock_mode && career_id == self.context.flags.mock_career_id {
            return Ok(self.context.file_path.clone());
        }
        let path = self.context.saves_dir.join(format!("{career_id}.json"));
        if !path.exists() {
            return Err(ServiceError::not_found(format!(
                "Ingen sparfil hittades för id '{career_id}'."
            )));
        }
        Ok(path)
    }
}
