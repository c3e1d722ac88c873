//! Profile and quote models.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Profile variants with different focus and tooling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    #[default]
    Default,
    Conference,
    Afterhours,
}

impl ProfileMode {
    pub const ALL: [ProfileMode; 3] = [
        ProfileMode::Default,
        ProfileMode::Conference,
        ProfileMode::Afterhours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileMode::Default => "default",
            ProfileMode::Conference => "conference",
            ProfileMode::Afterhours => "afterhours",
        }
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProfileMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("Unknown profile mode '{value}'"))
    }
}

/// Query parameters for the profile endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct ProfileQuery {
    /// Profile mode: default, conference or afterhours
    pub mode: Option<String>,
}

/// Public profile information
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct Profile {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub location: String,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub methods: Vec<String>,
    pub current_focus: Option<String>,
    pub favorite_tools: Option<Vec<String>>,
}

/// Query parameters for the quote endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct QuoteQuery {
    /// Quote topic (e.g., general, ai)
    pub topic: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Apiv2Schema)]
pub struct Quote {
    pub text: String,
    pub topic: Option<String>,
    pub context: Option<String>,
}
