use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-text answers to the GTM questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireInput {
    pub gtm_strategy: String,
    pub alignment: String,
    pub tech_stack: String,
    pub kpis: String,
    pub challenges: String,
}

/// GTM maturity stage, ordered from least to most mature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaturityStage {
    Initial,
    Developing,
    Established,
    Advanced,
    Leading,
}

impl MaturityStage {
    /// All stages in ascending order, as they appear on the wire.
    pub const NAMES: &'static [&'static str] =
        &["Initial", "Developing", "Established", "Advanced", "Leading"];

    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityStage::Initial => "Initial",
            MaturityStage::Developing => "Developing",
            MaturityStage::Established => "Established",
            MaturityStage::Advanced => "Advanced",
            MaturityStage::Leading => "Leading",
        }
    }
}

impl fmt::Display for MaturityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MaturityStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initial" => Ok(MaturityStage::Initial),
            "Developing" => Ok(MaturityStage::Developing),
            "Established" => Ok(MaturityStage::Established),
            "Advanced" => Ok(MaturityStage::Advanced),
            "Leading" => Ok(MaturityStage::Leading),
            _ => Err(format!("Unknown maturity stage: {}", s)),
        }
    }
}

/// Output of the prerequisite stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityAssessment {
    pub maturity_stage: MaturityStage,
    pub readiness_score: f64,
}

/// Output of the executive summary stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub executive_summary: String,
}

/// Output of the recommendations stage. List fields are ordered items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub actionable_recommendations: Vec<String>,
    pub strategic_focus_areas: Vec<String>,
    pub ai_integration_opportunities: Vec<String>,
    pub expected_impact: String,
}

/// Output of the AI opportunities stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOpportunities {
    pub ai_opportunities: String,
}

/// Aggregated result of a successful analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBundle {
    pub maturity_assessment: MaturityAssessment,
    pub executive_summary: String,
    pub recommendation_set: RecommendationSet,
    pub ai_opportunities: String,
}

/// Input of the executive summary stage: the answers plus the assessment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    #[serde(flatten)]
    pub questionnaire: QuestionnaireInput,
    pub maturity_stage: MaturityStage,
    pub readiness_score: f64,
}

/// Input of the recommendations stage, keyed by the serialized questionnaire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsInput {
    pub questionnaire: String,
    pub maturity_stage: MaturityStage,
    pub readiness_score: f64,
}

/// Input of the AI opportunities stage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOpportunitiesInput {
    pub maturity_stage: MaturityStage,
    pub readiness_score: f64,
    pub challenges: String,
}
