// src/models/review.rs

use serde::{Deserialize, Serialize};

/// Author shown when the provider omits a reviewer name
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Short review or tip snippet for a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub text: String,
}

impl Review {
    /// Build a review, defaulting a missing or blank author to "Anonymous"
    pub fn new(author: Option<String>, text: Option<String>) -> Self {
        Self {
            author: author
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
            text: text.unwrap_or_default(),
        }
    }
}

/// Photos and reviews fetched for one place
/// DOCUMENTATION: Looked up by place identifier at assembly time; both
/// sequences are empty when the corresponding fetch failed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceMedia {
    pub photos: Vec<String>,
    pub reviews: Vec<Review>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_author_defaults_to_anonymous() {
        let review = Review::new(None, Some("Lovely and calm".to_string()));
        assert_eq!(review.author, "Anonymous");

        let review = Review::new(Some("  ".to_string()), None);
        assert_eq!(review.author, "Anonymous");
        assert_eq!(review.text, "");

        let review = Review::new(Some("Sam".to_string()), Some("Nice".to_string()));
        assert_eq!(review.author, "Sam");
    }
}
