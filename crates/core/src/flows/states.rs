use serde::{Deserialize, Serialize};

/// Stages of one trade-in assessment, in forward order. The derived ordering
/// is the flow order: a stage has been reached when the current stage
/// compares greater or equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssessmentStage {
    Started,
    VariantSelected,
    ConditionAnswered,
    DefectsSelected,
    AccessoriesSelected,
    Quoted,
}

impl AssessmentStage {
    /// User-facing name of the step a visitor is sent back to.
    pub fn step_name(&self) -> &'static str {
        match self {
            Self::Started => "variant selection",
            Self::VariantSelected => "condition questions",
            Self::ConditionAnswered => "defect selection",
            Self::DefectsSelected => "accessory selection",
            Self::AccessoriesSelected | Self::Quoted => "quote",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentEvent {
    VariantChosen,
    ConditionCommitted,
    DefectsCommitted,
    AccessoriesCommitted,
    QuoteRequested,
}

/// Per-step requirements the committing caller has already evaluated; the
/// engine only enforces that the list is empty before advancing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StepContext {
    pub missing_requirements: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    CollectConditionAnswers,
    CollectDefects,
    CollectAccessories,
    ComputeQuote,
    CreateOfferSession,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: AssessmentStage,
    pub to: AssessmentStage,
    pub event: AssessmentEvent,
    pub actions: Vec<FlowAction>,
}
