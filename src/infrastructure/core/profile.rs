use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::domain::core::Applicant;

/// Client-side persisted applicant profile, so a returning user is not asked
/// to re-enter their details. Only the plain profile fields are stored; the
/// `Applicant` type carries no photo and no server-assigned id by
/// construction.
pub struct ProfileCache {
    path: PathBuf,
}

impl ProfileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file means no saved profile; a corrupt one is treated the
    /// same way rather than blocking startup.
    pub fn load(&self) -> Result<Option<Applicant>, ProfileCacheError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        match serde_json::from_str(&text) {
            Ok(applicant) => Ok(Some(applicant)),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "discarding unreadable profile cache");
                Ok(None)
            }
        }
    }

    pub fn store(&self, applicant: &Applicant) -> Result<(), ProfileCacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(applicant)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ProfileCacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileCacheError {
    #[error("profile cache I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("profile cache encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use crate::domain::core::Gender;

    use super::*;

    fn cache(name: &str) -> ProfileCache {
        let path = std::env::temp_dir()
            .join("sunprofile-tests")
            .join(format!("{}-{}.json", name, std::process::id()));
        let cache = ProfileCache::new(path);
        cache.clear().unwrap();
        cache
    }

    fn applicant() -> Applicant {
        Applicant::create(
            "20260001".into(),
            "Lee".to_owned(),
            20,
            Gender::Female,
            Some("MBTI: INFP".to_owned()),
        )
        .unwrap()
    }

    #[test]
    fn missing_file_is_no_profile() {
        assert!(cache("missing").load().unwrap().is_none());
    }

    #[test]
    fn profile_survives_a_round_trip() {
        let cache = cache("round-trip");
        cache.store(&applicant()).unwrap();
        assert_eq!(cache.load().unwrap(), Some(applicant()));
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let cache = cache("corrupt");
        fs::write(&cache.path, "{not json").unwrap();
        assert!(cache.load().unwrap().is_none());
        cache.clear().unwrap();
    }
}
