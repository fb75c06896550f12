pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, TradeInFlow};
pub use states::{AssessmentEvent, AssessmentStage, FlowAction, StepContext, TransitionOutcome};
