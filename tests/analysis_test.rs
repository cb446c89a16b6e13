//! Analysis pipeline integration tests
//!
//! A scripted GenerationBackend records every structured call so tests can
//! assert on call counts, ordering, and the inputs each stage received.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;
use tokio_test::{assert_err, assert_ok};

use gtm_analyst::analysis::{
    AnalysisPipeline, MaturityStage, QuestionnaireInput, ANALYSIS_FAILED_MESSAGE,
};
use gtm_analyst::backend::{
    AssistantTurn, ConversationRequest, GenerationBackend, StructuredRequest,
};
use gtm_analyst::config::PipeConfig;
use gtm_analyst::error::{AnalysisError, AnalysisErrorKind, LangbaseError, LangbaseResult};

const DOWNSTREAM: [&str; 3] = [
    "executive_summary",
    "actionable_recommendations",
    "ai_opportunities",
];

enum Reply {
    Completion(String),
    Fail,
}

#[derive(Default)]
struct StubBackend {
    replies: HashMap<&'static str, Reply>,
    calls: Mutex<Vec<StructuredRequest>>,
    downstream_barrier: Option<Arc<Barrier>>,
}

impl StubBackend {
    fn healthy() -> Self {
        let mut replies = HashMap::new();
        replies.insert(
            "maturity_analysis",
            Reply::Completion(
                r#"{"maturityStage": "Developing", "readinessScore": 42}"#.to_string(),
            ),
        );
        replies.insert(
            "executive_summary",
            Reply::Completion(
                json!({"executiveSummary": "The organization is building its GTM foundations."})
                    .to_string(),
            ),
        );
        replies.insert(
            "actionable_recommendations",
            Reply::Completion(
                json!({
                    "actionableRecommendations": ["Define an ICP", "Adopt a shared CRM"],
                    "strategicFocusAreas": ["Sales and marketing alignment"],
                    "aiIntegrationOpportunities": ["Lead scoring"],
                    "expectedImpact": "Shorter sales cycles"
                })
                .to_string(),
            ),
        );
        replies.insert(
            "ai_opportunities",
            Reply::Completion(
                json!({"aiOpportunities": "Automate lead qualification."}).to_string(),
            ),
        );
        Self {
            replies,
            ..Default::default()
        }
    }

    fn with_reply(mut self, operation: &'static str, reply: Reply) -> Self {
        self.replies.insert(operation, reply);
        self
    }

    fn with_downstream_barrier(mut self) -> Self {
        self.downstream_barrier = Some(Arc::new(Barrier::new(DOWNSTREAM.len())));
        self
    }

    fn operations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.operation.clone())
            .collect()
    }

    fn request(&self, operation: &str) -> StructuredRequest {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.operation == operation)
            .cloned()
            .unwrap_or_else(|| panic!("no call recorded for {}", operation))
    }
}

#[async_trait]
impl GenerationBackend for StubBackend {
    async fn invoke_structured(&self, request: StructuredRequest) -> LangbaseResult<String> {
        let operation = request.operation.clone();
        self.calls.lock().unwrap().push(request);

        if DOWNSTREAM.contains(&operation.as_str()) {
            if let Some(barrier) = &self.downstream_barrier {
                barrier.wait().await;
            }
        }

        match self.replies.get(operation.as_str()) {
            Some(Reply::Completion(text)) => Ok(text.clone()),
            Some(Reply::Fail) | None => Err(LangbaseError::Api {
                status: 500,
                message: format!("{} failed", operation),
            }),
        }
    }

    async fn invoke_conversational(
        &self,
        _request: ConversationRequest,
    ) -> LangbaseResult<AssistantTurn> {
        Err(LangbaseError::InvalidResponse {
            message: "not used by the pipeline".to_string(),
        })
    }
}

fn answer(topic: &str) -> String {
    format!(
        "Our {} is documented and reviewed quarterly by the leadership team.",
        topic
    )
}

fn questionnaire() -> QuestionnaireInput {
    QuestionnaireInput {
        gtm_strategy: answer("go-to-market strategy"),
        alignment: answer("sales and marketing alignment"),
        tech_stack: answer("CRM and marketing automation stack"),
        kpis: answer("pipeline, win rate and CAC tracking"),
        challenges: answer("lead quality and long sales cycle problem"),
    }
}

fn pipeline(backend: Arc<StubBackend>) -> AnalysisPipeline {
    AnalysisPipeline::new(backend, &PipeConfig::default())
}

#[tokio::test]
async fn test_full_run_aggregates_bundle() {
    let backend = Arc::new(StubBackend::healthy());
    let bundle = assert_ok!(pipeline(backend.clone()).run(questionnaire()).await);

    assert_eq!(bundle.maturity_assessment.maturity_stage, MaturityStage::Developing);
    assert_eq!(bundle.maturity_assessment.readiness_score, 42.0);
    assert_eq!(
        bundle.executive_summary,
        "The organization is building its GTM foundations."
    );
    assert_eq!(
        bundle.recommendation_set.actionable_recommendations,
        vec!["Define an ICP".to_string(), "Adopt a shared CRM".to_string()]
    );
    assert_eq!(bundle.recommendation_set.expected_impact, "Shorter sales cycles");
    assert_eq!(bundle.ai_opportunities, "Automate lead qualification.");
    assert_eq!(backend.operations().len(), 4);
}

#[tokio::test]
async fn test_prerequisite_runs_first() {
    let backend = Arc::new(StubBackend::healthy());
    assert_ok!(pipeline(backend.clone()).run(questionnaire()).await);

    let operations = backend.operations();
    assert_eq!(operations[0], "maturity_analysis");
    let mut downstream = operations[1..].to_vec();
    downstream.sort();
    let mut expected: Vec<String> = DOWNSTREAM.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(downstream, expected);
}

#[tokio::test]
async fn test_downstream_stages_run_concurrently() {
    // Each downstream call blocks until all three have started
    let backend = Arc::new(StubBackend::healthy().with_downstream_barrier());

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline(backend.clone()).run(questionnaire()),
    )
    .await
    .expect("downstream stages should not wait on each other");

    assert_ok!(result);
}

#[tokio::test]
async fn test_maturity_feeds_every_downstream_stage() {
    let backend = Arc::new(StubBackend::healthy());
    assert_ok!(pipeline(backend.clone()).run(questionnaire()).await);

    for operation in DOWNSTREAM {
        let request = backend.request(operation);
        assert!(
            request.instructions.contains("Developing"),
            "{} did not receive the maturity stage",
            operation
        );
        assert!(request.instructions.contains("42"));
    }

    let recommendations = backend.request("actionable_recommendations");
    assert!(recommendations.instructions.contains("\"gtmStrategy\""));

    let ai = backend.request("ai_opportunities");
    assert!(ai.instructions.contains("lead quality"));
    assert!(!ai.instructions.contains("CRM and marketing automation stack"));
}

#[tokio::test]
async fn test_short_answer_is_invalid_input_without_backend_calls() {
    let backend = Arc::new(StubBackend::healthy());
    let mut input = questionnaire();
    input.kpis = "x".repeat(49);

    let err = assert_err!(pipeline(backend.clone()).run(input).await);
    match &err {
        AnalysisError::InvalidInput { field, .. } => assert_eq!(field, "kpis"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
    assert_eq!(err.kind(), AnalysisErrorKind::InvalidInput);
    assert!(err.to_body().message.starts_with("kpis:"));
    assert!(backend.operations().is_empty());
}

#[tokio::test]
async fn test_padding_does_not_count_toward_length() {
    let backend = Arc::new(StubBackend::healthy());
    let mut input = questionnaire();
    input.challenges = format!("   {}   ", "y".repeat(48));

    let err = assert_err!(pipeline(backend.clone()).run(input).await);
    assert!(matches!(err, AnalysisError::InvalidInput { ref field, .. } if field == "challenges"));
    assert!(backend.operations().is_empty());
}

#[tokio::test]
async fn test_exactly_minimum_length_is_accepted() {
    let backend = Arc::new(StubBackend::healthy());
    let mut input = questionnaire();
    input.alignment = "a".repeat(50);

    assert_ok!(pipeline(backend).run(input).await);
}

#[tokio::test]
async fn test_missing_answer_in_document_is_invalid_input() {
    let backend = Arc::new(StubBackend::healthy());
    let mut document = serde_json::to_value(questionnaire()).unwrap();
    document.as_object_mut().unwrap().remove("kpis");

    let err = assert_err!(pipeline(backend.clone()).run_value(&document).await);
    assert_eq!(
        err,
        AnalysisError::InvalidInput {
            field: "kpis".to_string(),
            reason: "is required".to_string(),
        }
    );
    assert_eq!(err.to_body().kind, AnalysisErrorKind::InvalidInput);
    assert!(backend.operations().is_empty());
}

#[tokio::test]
async fn test_null_or_mistyped_answer_in_document_is_invalid_input() {
    let backend = Arc::new(StubBackend::healthy());
    let mut document = serde_json::to_value(questionnaire()).unwrap();
    document["kpis"] = serde_json::Value::Null;
    document["techStack"] = json!(42);

    let err = assert_err!(pipeline(backend.clone()).run_value(&document).await);
    assert!(matches!(err, AnalysisError::InvalidInput { ref field, .. } if field == "techStack"));

    let err = assert_err!(pipeline(backend.clone()).run_value(&json!([1, 2])).await);
    assert!(matches!(err, AnalysisError::InvalidInput { ref field, .. } if field == "$"));
    assert!(backend.operations().is_empty());
}

#[tokio::test]
async fn test_valid_document_runs_full_analysis() {
    let backend = Arc::new(StubBackend::healthy());
    let document = serde_json::to_value(questionnaire()).unwrap();

    let bundle = assert_ok!(pipeline(backend.clone()).run_value(&document).await);
    assert_eq!(bundle.maturity_assessment.maturity_stage, MaturityStage::Developing);
    assert_eq!(backend.operations().len(), 4);
}

#[tokio::test]
async fn test_prerequisite_failure_skips_downstream() {
    let backend = Arc::new(StubBackend::healthy().with_reply("maturity_analysis", Reply::Fail));

    let err = assert_err!(pipeline(backend.clone()).run(questionnaire()).await);
    assert_eq!(
        err,
        AnalysisError::Failed {
            message: ANALYSIS_FAILED_MESSAGE.to_string()
        }
    );
    assert_eq!(backend.operations(), vec!["maturity_analysis".to_string()]);
}

#[tokio::test]
async fn test_prerequisite_contract_violation_skips_downstream() {
    let backend = Arc::new(StubBackend::healthy().with_reply(
        "maturity_analysis",
        Reply::Completion(r#"{"maturityStage": "Expert", "readinessScore": 42}"#.to_string()),
    ));

    let err = assert_err!(pipeline(backend.clone()).run(questionnaire()).await);
    assert_eq!(err.kind(), AnalysisErrorKind::AnalysisError);
    assert_eq!(backend.operations().len(), 1);
}

#[tokio::test]
async fn test_single_downstream_failure_fails_whole_run() {
    for failing in DOWNSTREAM {
        let backend = Arc::new(StubBackend::healthy().with_reply(failing, Reply::Fail));

        let err = assert_err!(pipeline(backend).run(questionnaire()).await);
        let body = err.to_body();
        assert_eq!(body.kind, AnalysisErrorKind::AnalysisError);
        assert_eq!(body.message, ANALYSIS_FAILED_MESSAGE);
        assert!(!body.message.contains(failing));
    }
}

#[tokio::test]
async fn test_downstream_output_violation_fails_run() {
    let backend = Arc::new(StubBackend::healthy().with_reply(
        "actionable_recommendations",
        Reply::Completion(
            json!({
                "actionableRecommendations": "- Define an ICP\n- Adopt a shared CRM",
                "strategicFocusAreas": ["Alignment"],
                "aiIntegrationOpportunities": ["Scoring"],
                "expectedImpact": "Faster cycles"
            })
            .to_string(),
        ),
    ));

    let err = assert_err!(pipeline(backend).run(questionnaire()).await);
    assert_eq!(err.kind(), AnalysisErrorKind::AnalysisError);
}

#[tokio::test]
async fn test_fenced_completion_is_accepted() {
    let backend = Arc::new(StubBackend::healthy().with_reply(
        "maturity_analysis",
        Reply::Completion(
            "```json\n{\"maturityStage\": \"Advanced\", \"readinessScore\": 77.5}\n```".to_string(),
        ),
    ));

    let bundle = assert_ok!(pipeline(backend).run(questionnaire()).await);
    assert_eq!(bundle.maturity_assessment.maturity_stage, MaturityStage::Advanced);
    assert_eq!(bundle.maturity_assessment.readiness_score, 77.5);
}

#[tokio::test]
async fn test_deterministic_backend_gives_identical_bundles() {
    let backend = Arc::new(StubBackend::healthy());
    let pipeline = pipeline(backend);

    let first = assert_ok!(pipeline.run(questionnaire()).await);
    let second = assert_ok!(pipeline.run(questionnaire()).await);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_bundle_wire_format() {
    let backend = Arc::new(StubBackend::healthy());
    let bundle = assert_ok!(pipeline(backend).run(questionnaire()).await);

    let value = serde_json::to_value(&bundle).unwrap();
    assert_eq!(value["maturityAssessment"]["maturityStage"], "Developing");
    assert_eq!(value["maturityAssessment"]["readinessScore"], 42.0);
    assert!(value["recommendationSet"]["strategicFocusAreas"].is_array());
    assert!(value["executiveSummary"].is_string());
}
