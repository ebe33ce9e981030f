//! Classification action orchestration
//!
//! Selection → classify → resolve stream URLs → joined report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

use crate::classify::{ClassScore, ClassificationMatch, Classifier, TwelveLabsClassifier};
use crate::config::Config;
use crate::error::{ResolveFailure, Result};
use crate::resolver::{TwelveLabsVideoLookup, VideoLookup, VideoResolver, VideoUrlMap};
use crate::taxonomy::{Category, CustomCategoryForm, TaxonomyStore};

/// One match joined with its stream URL
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMatch {
    /// 1-based position in the service's result order
    pub position: usize,
    pub video_id: String,
    pub classes: Vec<ClassScore>,
    pub stream_url: Option<String>,
    pub unavailable_reason: Option<ResolveFailure>,
}

impl ResolvedMatch {
    fn join(position: usize, matched: ClassificationMatch, urls: &VideoUrlMap) -> Self {
        let (stream_url, unavailable_reason) = match urls.get(&matched.video_id) {
            Some(Ok(url)) => (Some(url.clone()), None),
            Some(Err(failure)) => (None, Some(failure.clone())),
            None => (None, Some(ResolveFailure::MissingUrl)),
        };

        Self {
            position,
            video_id: matched.video_id,
            classes: matched.classes,
            stream_url,
            unavailable_reason,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.stream_url.is_some()
    }
}

/// Result of one classify action
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub index_id: String,
    pub categories: Vec<String>,
    pub matches: Vec<ResolvedMatch>,
    pub generated_at: DateTime<Utc>,
}

impl ClassificationReport {
    pub fn total(&self) -> usize {
        self.matches.len()
    }

    /// User-facing warnings for videos that cannot be played
    pub fn warnings(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter_map(|m| {
                m.unavailable_reason
                    .as_ref()
                    .map(|reason| format!("Video URL not available for {}: {}", m.video_id, reason))
            })
            .collect()
    }
}

/// Drives classify actions for a session
pub struct ClassificationController<C, L> {
    classifier: C,
    resolver: VideoResolver<L>,
    index_id: String,
    include_clips: bool,
}

/// Controller over boxed backends, as built from configuration
pub type DynController = ClassificationController<Box<dyn Classifier>, Box<dyn VideoLookup>>;

impl DynController {
    /// Wire up the Twelve Labs clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let index_id = config.index_id()?.to_string();
        let classifier: Box<dyn Classifier> = Box::new(TwelveLabsClassifier::new(config.clone())?);
        let lookup: Box<dyn VideoLookup> = Box::new(TwelveLabsVideoLookup::new(config.clone())?);

        Ok(Self::new(
            classifier,
            VideoResolver::new(lookup, config.service.resolve_concurrency),
            index_id,
            config.service.include_clips,
        ))
    }
}

impl<C: Classifier, L: VideoLookup> ClassificationController<C, L> {
    pub fn new(
        classifier: C,
        resolver: VideoResolver<L>,
        index_id: impl Into<String>,
        include_clips: bool,
    ) -> Self {
        Self {
            classifier,
            resolver,
            index_id: index_id.into(),
            include_clips,
        }
    }

    pub fn index_id(&self) -> &str {
        &self.index_id
    }

    /// Validate the add-category form and append it to the session
    pub fn add_custom(&self, session: &mut TaxonomyStore, form: &CustomCategoryForm) -> Result<Category> {
        let category = form.parse()?;
        session.add_custom(category.name.clone(), category.prompts.clone());
        info!("➕ Custom category '{}' added", category.name);
        Ok(category)
    }

    /// Run one classify action for the selected category names.
    ///
    /// Selection errors are raised before any network call. Stream URL
    /// failures are reported per match and never fail the action.
    pub async fn classify(
        &self,
        session: &TaxonomyStore,
        selected: &[String],
    ) -> Result<ClassificationReport> {
        let categories = session.select(selected)?;

        let matches = self
            .classifier
            .classify(&self.index_id, &categories, self.include_clips)
            .await?;

        let video_ids: BTreeSet<String> = matches.iter().map(|m| m.video_id.clone()).collect();
        let urls = self.resolver.resolve(&video_ids, &self.index_id).await;

        let matches: Vec<ResolvedMatch> = matches
            .into_iter()
            .enumerate()
            .map(|(i, matched)| ResolvedMatch::join(i + 1, matched, &urls))
            .collect();

        let report = ClassificationReport {
            index_id: self.index_id.clone(),
            categories: categories.into_iter().map(|c| c.name).collect(),
            matches,
            generated_at: Utc::now(),
        };

        info!(
            "🎉 Total videos classified: {} ({} without a stream URL)",
            report.total(),
            urls.len() - urls.resolved_count()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifierError;
    use crate::resolver::StreamResult;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingClassifier {
        requests: Arc<Mutex<Vec<Vec<Category>>>>,
        fail: bool,
    }

    #[async_trait]
    impl Classifier for RecordingClassifier {
        async fn classify(
            &self,
            _index_id: &str,
            categories: &[Category],
            _include_clips: bool,
        ) -> Result<Vec<ClassificationMatch>> {
            self.requests.lock().unwrap().push(categories.to_vec());
            if self.fail {
                return Err(ClassifierError::Service("503 Service Unavailable".to_string()));
            }

            let score = |name: &str| ClassScore {
                name: name.to_string(),
                score: 0.83,
                duration_ratio: 0.41,
                clips: Vec::new(),
            };
            Ok(vec![
                ClassificationMatch {
                    video_id: "v2".to_string(),
                    classes: vec![score(&categories[0].name)],
                },
                ClassificationMatch {
                    video_id: "v1".to_string(),
                    classes: vec![score(&categories[0].name)],
                },
                ClassificationMatch {
                    video_id: "v2".to_string(),
                    classes: vec![],
                },
            ])
        }
    }

    #[derive(Default)]
    struct CountingLookup {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl VideoLookup for CountingLookup {
        async fn stream_url(&self, _index_id: &str, video_id: &str) -> StreamResult {
            self.calls.lock().unwrap().push(video_id.to_string());
            match video_id {
                "v1" => Ok(format!("https://cdn.example.com/{}.m3u8", video_id)),
                _ => Err(ResolveFailure::MissingUrl),
            }
        }
    }

    fn controller(
        classifier: RecordingClassifier,
        lookup: CountingLookup,
    ) -> ClassificationController<RecordingClassifier, CountingLookup> {
        ClassificationController::new(classifier, VideoResolver::new(lookup, 2), "idx", true)
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_network_calls() {
        let classifier = RecordingClassifier::default();
        let lookup = CountingLookup::default();
        let requests = classifier.requests.clone();
        let calls = lookup.calls.clone();
        let controller = controller(classifier, lookup);

        let err = controller.classify(&TaxonomyStore::new(), &[]).await.unwrap_err();

        assert!(err.is_user_input());
        assert!(requests.lock().unwrap().is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_category_reaches_payload_unmodified() {
        let classifier = RecordingClassifier::default();
        let requests = classifier.requests.clone();
        let controller = controller(classifier, CountingLookup::default());

        let mut session = TaxonomyStore::new();
        let form = CustomCategoryForm::new("Breaking", "b-boy battle, power moves");
        controller.add_custom(&mut session, &form).unwrap();
        assert!(session.take_freshly_added());

        controller
            .classify(&session, &["Breaking".to_string()])
            .await
            .unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            vec![Category::new(
                "Breaking",
                vec!["b-boy battle".to_string(), "power moves".to_string()]
            )]
        );
    }

    #[tokio::test]
    async fn test_report_joins_urls_and_preserves_scores() {
        let lookup = CountingLookup::default();
        let calls = lookup.calls.clone();
        let controller = controller(RecordingClassifier::default(), lookup);

        let report = controller
            .classify(&TaxonomyStore::new(), &["CombatSports".to_string()])
            .await
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.categories, vec!["CombatSports"]);

        let ids: Vec<_> = report.matches.iter().map(|m| m.video_id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1", "v2"]);
        assert_eq!(report.matches[0].position, 1);

        assert!(!report.matches[0].is_playable());
        assert_eq!(
            report.matches[1].stream_url.as_deref(),
            Some("https://cdn.example.com/v1.m3u8")
        );
        assert_eq!(report.matches[1].classes[0].score, 0.83);
        assert_eq!(report.matches[1].classes[0].duration_ratio, 0.41);
        assert_eq!(report.warnings().len(), 2);

        // distinct ids only
        let mut looked_up = calls.lock().unwrap().clone();
        looked_up.sort();
        assert_eq!(looked_up, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_service_error_aborts_before_resolution() {
        let classifier = RecordingClassifier {
            fail: true,
            ..Default::default()
        };
        let lookup = CountingLookup::default();
        let calls = lookup.calls.clone();
        let controller = controller(classifier, lookup);

        let err = controller
            .classify(&TaxonomyStore::new(), &["TeamSports".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ClassifierError::Service(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    /// Log sink shared between the test and the subscriber
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unresolved_video_is_warned_once() {
        let logs = LogBuffer::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        // v2 appears twice in the results and has no stream URL
        let controller = controller(RecordingClassifier::default(), CountingLookup::default());
        controller
            .classify(&TaxonomyStore::new(), &["CombatSports".to_string()])
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("v2").count(), 1);
        assert!(output.contains("WARN"));
        assert!(output.contains("1 without a stream URL"));
    }

    #[test]
    fn test_invalid_form_leaves_session_untouched() {
        let controller = controller(RecordingClassifier::default(), CountingLookup::default());
        let mut session = TaxonomyStore::new();

        let err = controller
            .add_custom(&mut session, &CustomCategoryForm::new("Surfing", ""))
            .unwrap_err();

        assert!(err.is_user_input());
        assert!(session.list_custom().is_empty());
        assert!(!session.take_freshly_added());
    }
}
