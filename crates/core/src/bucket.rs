//! Status buckets of a digest.

use serde::{Deserialize, Serialize};

/// A status bucket in an assignee's digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Planned for the iteration, not started
    #[serde(rename = "todo")]
    Todo,
    /// Being worked on
    #[serde(rename = "in-progress")]
    InProgress,
    /// Waiting on review
    #[serde(rename = "Under-Review")]
    UnderReview,
}

impl Bucket {
    /// All buckets, in digest order.
    pub const ALL: [Bucket; 3] = [Bucket::Todo, Bucket::InProgress, Bucket::UnderReview];

    /// Map a raw status option name to its bucket.
    ///
    /// Only the three project statuses below are tracked; anything else has
    /// no bucket.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "Spring Todo" => Some(Self::Todo),
            "In Progress" => Some(Self::InProgress),
            "Under Review" => Some(Self::UnderReview),
            _ => None,
        }
    }

    /// Key used in the JSON digest document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::UnderReview => "Under-Review",
        }
    }

    /// Section heading used in email bodies.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In-progress",
            Self::UnderReview => "Under-Review",
        }
    }

    /// Heading used in the console summary.
    pub fn status_label(self) -> &'static str {
        match self {
            Self::Todo => "Spring Todo",
            Self::InProgress => "In Progress",
            Self::UnderReview => "Under Review",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
