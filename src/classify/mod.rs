pub mod twelve_labs;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::taxonomy::Category;

pub use twelve_labs::TwelveLabsClassifier;

/// Analysis mode sent with every request
pub const VISUAL_OPTION: &str = "visual";

/// One video's classification result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationMatch {
    pub video_id: String,
    pub classes: Vec<ClassScore>,
}

/// Score of one category against one video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassScore {
    pub name: String,
    pub score: f64,
    pub duration_ratio: f64,
    /// Matched segments, present when clip detail was requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clips: Vec<ClipMatch>,
}

/// A matched segment within a video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipMatch {
    pub start: f64,
    pub end: f64,
    pub score: f64,
    #[serde(default)]
    pub option: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Trait for classification backends
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify every video in an index against the given categories.
    ///
    /// Matches come back in the order the service returns them.
    async fn classify(
        &self,
        index_id: &str,
        categories: &[Category],
        include_clips: bool,
    ) -> Result<Vec<ClassificationMatch>>;
}

#[async_trait]
impl<T: Classifier + ?Sized> Classifier for Box<T> {
    async fn classify(
        &self,
        index_id: &str,
        categories: &[Category],
        include_clips: bool,
    ) -> Result<Vec<ClassificationMatch>> {
        (**self).classify(index_id, categories, include_clips).await
    }
}
