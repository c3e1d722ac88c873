//! Skills, talks and projects.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SkillsQuery {
    /// Filter by skill domain (e.g., Cloud, Security, AI), case-insensitive
    pub domain: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SkillsList {
    pub skills: Vec<Skill>,
    pub total: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct Talk {
    pub id: String,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub venue: Option<String>,
    pub topics: Vec<String>,
    pub slides_url: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct TalksQuery {
    /// Filter talks by the year they were given
    pub year: Option<i32>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct TalksList {
    pub talks: Vec<Talk>,
    pub total: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub tech_stack: Vec<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ProjectsList {
    pub projects: Vec<Project>,
    pub total: usize,
}

impl From<Vec<Skill>> for SkillsList {
    fn from(skills: Vec<Skill>) -> Self {
        Self {
            total: skills.len(),
            skills,
        }
    }
}

impl From<Vec<Talk>> for TalksList {
    fn from(talks: Vec<Talk>) -> Self {
        Self {
            total: talks.len(),
            talks,
        }
    }
}

impl From<Vec<Project>> for ProjectsList {
    fn from(projects: Vec<Project>) -> Self {
        Self {
            total: projects.len(),
            projects,
        }
    }
}
