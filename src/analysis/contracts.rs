//! Operation contracts for the four analysis stages.

use crate::contract::{FieldKind, OperationContract, Shape};

use super::types::MaturityStage;

/// Minimum length, in characters, of each questionnaire answer.
pub const MIN_ANSWER_LENGTH: usize = 50;

/// Operation name of the prerequisite stage.
pub const MATURITY_OPERATION: &str = "maturity_analysis";
/// Operation name of the executive summary stage.
pub const EXECUTIVE_SUMMARY_OPERATION: &str = "executive_summary";
/// Operation name of the recommendations stage.
pub const RECOMMENDATIONS_OPERATION: &str = "actionable_recommendations";
/// Operation name of the AI opportunities stage.
pub const AI_OPPORTUNITIES_OPERATION: &str = "ai_opportunities";

const MATURITY_STAGE_DESC: &str = "GTM maturity stage from the prerequisite assessment";
const READINESS_SCORE_DESC: &str = "AI readiness score from 0 to 100";

fn answer() -> FieldKind {
    FieldKind::Text {
        min_len: MIN_ANSWER_LENGTH,
    }
}

fn readiness_score() -> FieldKind {
    FieldKind::Number {
        min: Some(0.0),
        max: Some(100.0),
    }
}

fn questionnaire_shape() -> Shape {
    Shape::new()
        .required("gtmStrategy", "Current go-to-market strategy", answer())
        .required("alignment", "Sales and marketing alignment", answer())
        .required("techStack", "GTM technology stack", answer())
        .required("kpis", "KPIs currently tracked", answer())
        .required("challenges", "Key GTM challenges", answer())
}

fn with_maturity(shape: Shape) -> Shape {
    shape
        .required(
            "maturityStage",
            MATURITY_STAGE_DESC,
            FieldKind::OneOf(MaturityStage::NAMES),
        )
        .required("readinessScore", READINESS_SCORE_DESC, readiness_score())
}

/// Prerequisite: questionnaire → maturity stage and readiness score.
pub fn maturity_contract() -> OperationContract {
    OperationContract::new(
        MATURITY_OPERATION,
        questionnaire_shape(),
        with_maturity(Shape::new()),
    )
}

/// Questionnaire plus assessment → executive summary.
pub fn executive_summary_contract() -> OperationContract {
    OperationContract::new(
        EXECUTIVE_SUMMARY_OPERATION,
        with_maturity(questionnaire_shape()),
        Shape::new().required(
            "executiveSummary",
            "Executive summary of the GTM assessment",
            FieldKind::Text { min_len: 1 },
        ),
    )
}

/// Serialized questionnaire plus assessment → recommendation set.
pub fn recommendations_contract() -> OperationContract {
    OperationContract::new(
        RECOMMENDATIONS_OPERATION,
        with_maturity(Shape::new().required(
            "questionnaire",
            "The full questionnaire serialized as JSON",
            FieldKind::Text { min_len: 2 },
        )),
        Shape::new()
            .required(
                "actionableRecommendations",
                "Concrete next steps, one per item",
                FieldKind::TextList { min_items: 1 },
            )
            .required(
                "strategicFocusAreas",
                "Areas to prioritize, one per item",
                FieldKind::TextList { min_items: 1 },
            )
            .required(
                "aiIntegrationOpportunities",
                "Where AI fits into the GTM motion, one per item",
                FieldKind::TextList { min_items: 1 },
            )
            .required(
                "expectedImpact",
                "Expected business impact",
                FieldKind::Text { min_len: 1 },
            ),
    )
}

/// Maturity stage and challenges → AI opportunity suggestions.
pub fn ai_opportunities_contract() -> OperationContract {
    OperationContract::new(
        AI_OPPORTUNITIES_OPERATION,
        with_maturity(Shape::new()).required("challenges", "Key GTM challenges", answer()),
        Shape::new().required(
            "aiOpportunities",
            "AI opportunity suggestions",
            FieldKind::Text { min_len: 1 },
        ),
    )
}
