use crate::error::ServiceResult;
use crate::flags::FeatureFlags;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths and flags shared by every service operation.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pub saves_dir: PathBuf,
    pub file_path: PathBuf,
    pub flags: FeatureFlags,
}

impl ServiceContext {
    pub fn from_paths(
        saves_dir: impl AsRef<Path>,
        file_path: Option<PathBuf>,
        flags: Option<FeatureFlags>,
    ) -> ServiceResult<Self> {
        let saves_dir = saves_dir.as_ref().to_path_buf();
        fs::create_dir_all(&saves_dir)?;

        let file_path = file_path.unwrap_or_else(|| saves_dir.join("career.json"));
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(ServiceContext {
            saves_dir,
            file_path,
            flags: flags.unwrap_or_else(FeatureFlags::from_env),
        })
    }

    pub fn with_file(&self, file_path: PathBuf) -> Self {
        ServiceContext {
            saves_dir: self.saves_dir.clone(),
            file_path,
            flags: self.flags.clone(),
        }
    }
}
