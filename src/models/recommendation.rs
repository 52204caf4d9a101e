use serde::{Deserialize, Serialize};

/// Reserved name of the sentinel returned when the account has no reviews.
pub const NO_REVIEWS_SENTINEL: &str = "No Reviews Found";

/// Reserved name of the sentinel returned when the generated text yielded
/// no structured records.
pub const PARSE_FAILED_SENTINEL: &str = "Recommendations Unavailable";

/// Reserved name of the sentinel returned when the generation call failed.
pub const GENERATION_FAILED_SENTINEL: &str = "Error";

/// A structured game recommendation parsed from generated text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub name: String,
    pub description: String,
    pub genres: String,
}

impl Recommendation {
    /// Sentinel for an account with no stored reviews. A terminal outcome,
    /// not a failure: there is simply nothing to base recommendations on.
    pub fn no_reviews() -> Self {
        Self {
            name: NO_REVIEWS_SENTINEL.to_string(),
            description: "Please submit reviews for better recommendations.".to_string(),
            genres: String::new(),
        }
    }

    /// Sentinel for a non-empty response that produced zero parsed records.
    pub fn parse_failed() -> Self {
        Self {
            name: PARSE_FAILED_SENTINEL.to_string(),
            description: "The generated response could not be read. Try refreshing.".to_string(),
            genres: String::new(),
        }
    }

    /// Sentinel for a failed text-generation call.
    pub fn generation_failed() -> Self {
        Self {
            name: GENERATION_FAILED_SENTINEL.to_string(),
            description: "Could not fetch recommendations due to an error.".to_string(),
            genres: String::new(),
        }
    }

    /// True for the placeholder records above, which carry a reserved name
    /// instead of a real game.
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self.name.as_str(),
            NO_REVIEWS_SENTINEL | PARSE_FAILED_SENTINEL | GENERATION_FAILED_SENTINEL
        )
    }
}
