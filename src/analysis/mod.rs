//! GTM questionnaire analysis.
//!
//! A run validates the questionnaire, invokes the maturity stage, then fans out
//! to the executive summary, recommendations and AI opportunities stages
//! concurrently. Any stage failure aborts the run; no partial bundle is ever
//! returned.

mod contracts;
mod pipeline;
mod types;

pub use contracts::{
    ai_opportunities_contract, executive_summary_contract, maturity_contract,
    recommendations_contract, AI_OPPORTUNITIES_OPERATION, EXECUTIVE_SUMMARY_OPERATION,
    MATURITY_OPERATION, MIN_ANSWER_LENGTH, RECOMMENDATIONS_OPERATION,
};
pub use pipeline::{AnalysisPipeline, PipelineStage, PipelineState, ANALYSIS_FAILED_MESSAGE};
pub use types::*;
