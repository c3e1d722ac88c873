//! Seed data loaded from flat JSON files.

use crate::{
    error::DataError,
    models::{Profile, ProfileMode, Project, Quote, Skill, Talk},
};
use serde::{Deserialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Profile fields that vary per mode
#[derive(Clone, Debug, Default, Deserialize)]
struct ModeFields {
    current_focus: Option<String>,
    favorite_tools: Option<Vec<String>>,
}

/// Layout of `profile.json`
#[derive(Clone, Debug, Deserialize)]
struct ProfileRecord {
    name: String,
    role: String,
    bio: String,
    location: String,
    website: Option<String>,
    linkedin: Option<String>,
    methods: Vec<String>,
    #[serde(default)]
    modes: HashMap<ProfileMode, ModeFields>,
}

/// Read-only content served by the API
///
/// Everything is read once at startup; a missing or malformed file is fatal.
#[derive(Clone, Debug)]
pub struct SeedData {
    profile: ProfileRecord,
    quotes: HashMap<String, Vec<Quote>>,
    skills: Vec<Skill>,
    talks: Vec<Talk>,
    projects: Vec<Project>,
}

impl SeedData {
    /// Load all seed files from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let data = Self {
            profile: read_json(dir.join("profile.json"))?,
            quotes: read_json(dir.join("quotes.json"))?,
            skills: read_json(dir.join("skills.json"))?,
            talks: read_json(dir.join("talks.json"))?,
            projects: read_json(dir.join("projects.json"))?,
        };

        tracing::info!(
            data_dir = %dir.display(),
            skills = data.skills.len(),
            talks = data.talks.len(),
            projects = data.projects.len(),
            "Loaded seed data"
        );

        Ok(data)
    }

    /// Profile with the fields of `mode` merged in
    pub fn profile(&self, mode: ProfileMode) -> Profile {
        let record = &self.profile;
        let fields = record.modes.get(&mode).cloned().unwrap_or_default();

        Profile {
            name: record.name.clone(),
            role: record.role.clone(),
            bio: record.bio.clone(),
            location: record.location.clone(),
            website: record.website.clone(),
            linkedin: record.linkedin.clone(),
            methods: record.methods.clone(),
            current_focus: fields.current_focus,
            favorite_tools: fields.favorite_tools,
        }
    }

    /// First quote for `topic`, falling back to the general topic
    pub fn quote(&self, topic: Option<&str>) -> Quote {
        let quotes = topic
            .and_then(|t| self.quotes.get(t))
            .or_else(|| self.quotes.get("general"));

        match quotes.and_then(|q| q.first()) {
            Some(quote) => quote.clone(),
            None => Quote {
                text: "It depends... but documentation usually helps.".to_string(),
                topic: Some(topic.unwrap_or("general").to_string()),
                context: Some("When in doubt, always a safe answer".to_string()),
            },
        }
    }

    pub fn skills(&self, domain: Option<&str>) -> Vec<Skill> {
        self.skills
            .iter()
            .filter(|s| domain.is_none_or(|d| s.domain.eq_ignore_ascii_case(d)))
            .cloned()
            .collect()
    }

    pub fn talks(&self, year: Option<i32>) -> Vec<Talk> {
        self.talks
            .iter()
            .filter(|t| year.is_none_or(|y| t.year == y))
            .cloned()
            .collect()
    }

    pub fn talk(&self, id: &str) -> Option<&Talk> {
        self.talks.iter().find(|t| t.id == id)
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.clone()
    }
}

fn read_json<T: DeserializeOwned>(path: PathBuf) -> Result<T, DataError> {
    let raw = fs::read_to_string(&path).map_err(|source| DataError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DataError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> SeedData {
        SeedData::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data")).unwrap()
    }

    #[test]
    fn test_profile_merges_mode_fields() {
        let data = seed();

        let default = data.profile(ProfileMode::Default);
        assert_eq!(default.name, "Mara Lindqvist");
        assert!(default.current_focus.is_some());

        let conference = data.profile(ProfileMode::Conference);
        assert_eq!(conference.name, default.name);
        assert_ne!(conference.current_focus, default.current_focus);
    }

    #[test]
    fn test_quote_falls_back_to_general() {
        let data = seed();
        let general = data.quote(None);
        assert_eq!(general.topic.as_deref(), Some("general"));
        assert_eq!(data.quote(Some("no-such-topic")), general);
        assert_eq!(data.quote(Some("ai")).topic.as_deref(), Some("ai"));
    }

    #[test]
    fn test_filters() {
        let data = seed();
        let ai = data.skills(Some("ai"));
        assert!(!ai.is_empty());
        assert!(ai.iter().all(|s| s.domain == "AI"));
        assert!(data.skills(Some("NonExistent")).is_empty());

        assert!(data.talks(Some(2025)).iter().all(|t| t.year == 2025));
        assert!(data.talks(Some(1999)).is_empty());
        assert_eq!(data.talks(None).len(), data.talks.len());
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let err = SeedData::load("/nonexistent/profile-api-data").unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
