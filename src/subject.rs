//! Subject channels
//!
//! Each subject keeps its own conversation history and system instructions.
//! The set is closed: anything outside it is rejected at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A fixed conversational channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Mathematics and physics questions
    MathPhysics,
    /// Chemistry questions
    Chemistry,
    /// Image uploads with an optional question
    ImageAnalysis,
}

impl Subject {
    /// Number of subjects
    pub const COUNT: usize = 3;

    /// Every subject, in display order
    pub const ALL: [Self; Self::COUNT] = [Self::MathPhysics, Self::Chemistry, Self::ImageAnalysis];

    /// Stable identifier used in history payloads and URLs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MathPhysics => "math_physics",
            Self::Chemistry => "chemistry",
            Self::ImageAnalysis => "image_analysis",
        }
    }

    /// Path segment of the ask endpoint
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::MathPhysics => "/math-physics",
            Self::Chemistry => "/chemistry",
            Self::ImageAnalysis => "/image-analysis",
        }
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MathPhysics => "Mathematics and Physics",
            Self::Chemistry => "Chemistry",
            Self::ImageAnalysis => "Image Analysis",
        }
    }

    /// Parse a subject identifier, returning `None` for anything outside the fixed set
    ///
    /// Accepts both the snake case identifier and the hyphenated route form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "math_physics" => Some(Self::MathPhysics),
            "chemistry" => Some(Self::Chemistry),
            "image_analysis" => Some(Self::ImageAnalysis),
            _ => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::UnknownSubject(s.to_string()))
    }
}
