/// Sports Classifier - Rust Implementation
///
/// Classifies the videos of a Twelve Labs index into Olympic sport categories,
/// built-in or user-defined, and resolves each match to a playable HLS stream.

pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod resolver;
pub mod taxonomy;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::classify::{ClassScore, ClassificationMatch, Classifier, TwelveLabsClassifier};
pub use crate::config::{ApiConfig, Config, ConfigBuilder};
pub use crate::controller::{ClassificationController, ClassificationReport, DynController, ResolvedMatch};
pub use crate::error::{ClassifierError, ResolveFailure, Result};
pub use crate::resolver::{TwelveLabsVideoLookup, VideoLookup, VideoResolver, VideoUrlMap};
pub use crate::taxonomy::{Category, CustomCategoryForm, TaxonomyStore};
