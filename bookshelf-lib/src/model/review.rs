//! Reader reviews

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

/// A review left by a visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub author_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub comment: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Aggregate figures over all reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvReviewStats {
    pub average_rating: f64,
    pub total_reviews: u64,
}
