use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::contracts::{
    ai_opportunities_contract, executive_summary_contract, maturity_contract,
    recommendations_contract,
};
use super::types::{
    AiOpportunities, AiOpportunitiesInput, AnalysisBundle, ExecutiveSummary, MaturityAssessment,
    QuestionnaireInput, RecommendationSet, RecommendationsInput, SummaryInput,
};
use crate::backend::GenerationBackend;
use crate::config::PipeConfig;
use crate::contract::StructuredInvocation;
use crate::error::{AnalysisError, InvocationError};
use crate::prompts::{
    AI_OPPORTUNITIES_PROMPT, AI_OPPORTUNITIES_TEMPLATE, EXECUTIVE_SUMMARY_PROMPT,
    EXECUTIVE_SUMMARY_TEMPLATE, MATURITY_PROMPT, MATURITY_TEMPLATE, RECOMMENDATIONS_PROMPT,
    RECOMMENDATIONS_TEMPLATE,
};

/// Message returned for any generation or contract failure.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to generate analysis. Please try again.";

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ValidatingInput,
    RunningPrerequisite,
    RunningDownstream,
    Aggregated,
    Failed,
}

/// A unit of work in the pipeline's dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Maturity,
    ExecutiveSummary,
    Recommendations,
    AiOpportunities,
}

impl PipelineStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Maturity => "maturity",
            PipelineStage::ExecutiveSummary => "executive_summary",
            PipelineStage::Recommendations => "recommendations",
            PipelineStage::AiOpportunities => "ai_opportunities",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Internal failure carrying stage identity for logging.
#[derive(Debug)]
struct StageFailure {
    stage: PipelineStage,
    source: InvocationError,
}

impl StageFailure {
    fn at(stage: PipelineStage) -> impl FnOnce(InvocationError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Four-stage GTM analysis: maturity first, then three concurrent stages.
pub struct AnalysisPipeline {
    backend: Arc<dyn GenerationBackend>,
    maturity: StructuredInvocation<QuestionnaireInput, MaturityAssessment>,
    summary: StructuredInvocation<SummaryInput, ExecutiveSummary>,
    recommendations: StructuredInvocation<RecommendationsInput, RecommendationSet>,
    ai_opportunities: StructuredInvocation<AiOpportunitiesInput, AiOpportunities>,
}

impl AnalysisPipeline {
    /// Build the pipeline and its contracts.
    pub fn new(backend: Arc<dyn GenerationBackend>, pipes: &PipeConfig) -> Self {
        Self {
            backend,
            maturity: StructuredInvocation::new(
                maturity_contract(),
                &pipes.maturity,
                MATURITY_PROMPT,
                MATURITY_TEMPLATE,
            ),
            summary: StructuredInvocation::new(
                executive_summary_contract(),
                &pipes.executive_summary,
                EXECUTIVE_SUMMARY_PROMPT,
                EXECUTIVE_SUMMARY_TEMPLATE,
            ),
            recommendations: StructuredInvocation::new(
                recommendations_contract(),
                &pipes.recommendations,
                RECOMMENDATIONS_PROMPT,
                RECOMMENDATIONS_TEMPLATE,
            ),
            ai_opportunities: StructuredInvocation::new(
                ai_opportunities_contract(),
                &pipes.ai_opportunities,
                AI_OPPORTUNITIES_PROMPT,
                AI_OPPORTUNITIES_TEMPLATE,
            ),
        }
    }

    /// Validate the questionnaire without generating anything.
    pub fn validate(&self, input: &QuestionnaireInput) -> Result<(), AnalysisError> {
        let value = serde_json::to_value(input).map_err(|e| AnalysisError::InvalidInput {
            field: "$".to_string(),
            reason: e.to_string(),
        })?;

        self.validate_value(&value)
    }

    /// Parse an untyped questionnaire document.
    ///
    /// Missing, null or mistyped answers are reported as
    /// [`AnalysisError::InvalidInput`] naming the offending field.
    pub fn parse_input(&self, value: &Value) -> Result<QuestionnaireInput, AnalysisError> {
        self.validate_value(value)?;

        QuestionnaireInput::deserialize(value).map_err(|e| AnalysisError::InvalidInput {
            field: "$".to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse then run an untyped questionnaire document.
    pub async fn run_value(&self, value: &Value) -> Result<AnalysisBundle, AnalysisError> {
        let input = match self.parse_input(value) {
            Ok(input) => input,
            Err(e) => {
                info!(error = %e, "Analysis input rejected");
                return Err(e);
            }
        };

        self.run(input).await
    }

    fn validate_value(&self, value: &Value) -> Result<(), AnalysisError> {
        self.maturity
            .contract()
            .validate_input(value)
            .map_err(|violation| AnalysisError::InvalidInput {
                field: violation.field,
                reason: violation.reason,
            })
    }

    /// Run the full analysis.
    ///
    /// Returns the aggregated bundle, [`AnalysisError::InvalidInput`] before any
    /// generation call, or an opaque [`AnalysisError::Failed`] if any stage fails.
    pub async fn run(&self, input: QuestionnaireInput) -> Result<AnalysisBundle, AnalysisError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let mut state = PipelineState::Idle;

        transition(&run_id, &mut state, PipelineState::ValidatingInput);
        if let Err(e) = self.validate(&input) {
            transition(&run_id, &mut state, PipelineState::Failed);
            info!(run_id = %run_id, error = %e, "Analysis input rejected");
            return Err(e);
        }

        match self.execute(&run_id, &mut state, input).await {
            Ok(bundle) => {
                transition(&run_id, &mut state, PipelineState::Aggregated);
                info!(
                    run_id = %run_id,
                    maturity_stage = %bundle.maturity_assessment.maturity_stage,
                    readiness_score = bundle.maturity_assessment.readiness_score,
                    latency_ms = start.elapsed().as_millis(),
                    "Analysis completed"
                );
                Ok(bundle)
            }
            Err(failure) => {
                transition(&run_id, &mut state, PipelineState::Failed);
                error!(
                    run_id = %run_id,
                    stage = %failure.stage,
                    error = %failure.source,
                    latency_ms = start.elapsed().as_millis(),
                    "Analysis stage failed"
                );
                Err(AnalysisError::Failed {
                    message: ANALYSIS_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }

    async fn execute(
        &self,
        run_id: &Uuid,
        state: &mut PipelineState,
        input: QuestionnaireInput,
    ) -> Result<AnalysisBundle, StageFailure> {
        let backend = self.backend.as_ref();

        transition(run_id, state, PipelineState::RunningPrerequisite);
        let assessment = self
            .maturity
            .invoke(backend, &input)
            .await
            .map_err(StageFailure::at(PipelineStage::Maturity))?;

        debug!(
            run_id = %run_id,
            maturity_stage = %assessment.maturity_stage,
            "Prerequisite stage completed"
        );

        let questionnaire = serde_json::to_string(&input).map_err(|e| StageFailure {
            stage: PipelineStage::Recommendations,
            source: InvocationError::Contract(crate::error::ContractViolation {
                operation: self.recommendations.name().to_string(),
                stage: crate::error::ContractStage::Input,
                field: "questionnaire".to_string(),
                reason: e.to_string(),
            }),
        })?;

        let summary_input = SummaryInput {
            questionnaire: input.clone(),
            maturity_stage: assessment.maturity_stage,
            readiness_score: assessment.readiness_score,
        };
        let recommendations_input = RecommendationsInput {
            questionnaire,
            maturity_stage: assessment.maturity_stage,
            readiness_score: assessment.readiness_score,
        };
        let ai_input = AiOpportunitiesInput {
            maturity_stage: assessment.maturity_stage,
            readiness_score: assessment.readiness_score,
            challenges: input.challenges,
        };

        transition(run_id, state, PipelineState::RunningDownstream);

        // First failure drops the other two in-flight calls
        let (summary, recommendations, ai) = tokio::try_join!(
            async {
                self.summary
                    .invoke(backend, &summary_input)
                    .await
                    .map_err(StageFailure::at(PipelineStage::ExecutiveSummary))
            },
            async {
                self.recommendations
                    .invoke(backend, &recommendations_input)
                    .await
                    .map_err(StageFailure::at(PipelineStage::Recommendations))
            },
            async {
                self.ai_opportunities
                    .invoke(backend, &ai_input)
                    .await
                    .map_err(StageFailure::at(PipelineStage::AiOpportunities))
            },
        )?;

        Ok(AnalysisBundle {
            maturity_assessment: assessment,
            executive_summary: summary.executive_summary,
            recommendation_set: recommendations,
            ai_opportunities: ai.ai_opportunities,
        })
    }
}

fn transition(run_id: &Uuid, state: &mut PipelineState, next: PipelineState) {
    debug!(run_id = %run_id, from = ?state, to = ?next, "Pipeline state transition");
    *state = next;
}
