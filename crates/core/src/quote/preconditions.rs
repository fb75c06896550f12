use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::assessment::AssessmentSession;
use crate::flows::states::AssessmentStage;
use crate::questions::ConditionQuestion;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessViolation {
    pub code: String,
    pub message: String,
    /// The earliest incomplete stage the user must return to.
    pub resume_stage: AssessmentStage,
    pub suggestion: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReadinessInput<'a> {
    pub session: &'a AssessmentSession,
    /// The question set in force for this assessment (collaborator-supplied
    /// or the built-in default).
    pub questions: &'a [ConditionQuestion],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResult {
    pub ready: bool,
    pub violations: Vec<ReadinessViolation>,
}

impl Default for ReadinessResult {
    fn default() -> Self {
        Self { ready: true, violations: Vec::new() }
    }
}

impl ReadinessResult {
    /// Where to send the user: the earliest stage any violation points at.
    pub fn earliest_incomplete_stage(&self) -> Option<AssessmentStage> {
        self.violations.iter().map(|violation| violation.resume_stage).min()
    }

    /// Unanswered-question ids, in the shape the flow engine's step context
    /// expects.
    pub fn missing_requirements(&self) -> Vec<String> {
        self.violations.iter().map(|violation| violation.code.clone()).collect()
    }
}

pub trait ReadinessCheck: Send + Sync {
    fn assess(&self, input: &ReadinessInput<'_>) -> ReadinessResult;
}

#[derive(Default)]
pub struct DeterministicReadinessCheck;

impl ReadinessCheck for DeterministicReadinessCheck {
    fn assess(&self, input: &ReadinessInput<'_>) -> ReadinessResult {
        assess_readiness(input)
    }
}

/// Validates every precondition the calculator relies on. The calculator
/// itself never defaults a missing price: a session failing any check here
/// must be routed back to `earliest_incomplete_stage`, not priced.
pub fn assess_readiness(input: &ReadinessInput<'_>) -> ReadinessResult {
    let mut result = ReadinessResult::default();
    let session = input.session;

    if session.product_id.0.trim().is_empty() {
        result.violations.push(ReadinessViolation {
            code: "MISSING_PRODUCT".to_owned(),
            message: "No product is attached to this assessment".to_owned(),
            resume_stage: AssessmentStage::Started,
            suggestion: Some("Pick a product to sell".to_owned()),
        });
    }

    if session.variant_id.0.trim().is_empty() {
        result.violations.push(ReadinessViolation {
            code: "MISSING_VARIANT".to_owned(),
            message: "No variant has been selected".to_owned(),
            resume_stage: AssessmentStage::Started,
            suggestion: Some("Choose the storage/RAM configuration".to_owned()),
        });
    }

    if session.base_price <= Decimal::ZERO {
        result.violations.push(ReadinessViolation {
            code: "NON_POSITIVE_BASE_PRICE".to_owned(),
            message: format!("Variant base price {} is not positive", session.base_price),
            resume_stage: AssessmentStage::Started,
            suggestion: Some("Re-select the variant to refresh its price".to_owned()),
        });
    }

    for question in input.questions.iter().filter(|question| question.required) {
        if !session.answered(&question.id) {
            result.violations.push(ReadinessViolation {
                code: format!("UNANSWERED_QUESTION:{}", question.id.0),
                message: format!("Required question `{}` has no answer", question.id.0),
                resume_stage: AssessmentStage::VariantSelected,
                suggestion: Some(question.prompt.clone()),
            });
        }
    }

    if !session.has_defect_selection() {
        result.violations.push(ReadinessViolation {
            code: "NO_DEFECT_SELECTION".to_owned(),
            message: "The defect step has not been committed".to_owned(),
            resume_stage: AssessmentStage::ConditionAnswered,
            suggestion: Some("Report defects or confirm the device has none".to_owned()),
        });
    }

    if !result.violations.is_empty() {
        result.ready = false;
    }

    result
}
