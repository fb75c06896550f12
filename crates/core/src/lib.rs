pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod questions;
pub mod quote;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
    TracingAuditSink,
};
pub use domain::assessment::{
    Accessory, Answer, AssessmentSession, Defect, QuestionId, NO_DEFECTS,
};
pub use domain::delta::{Delta, DeltaKind, DeltaSign};
pub use domain::product::{CategoryId, ProductId, Variant, VariantId};
pub use domain::snapshot::{AnswerPayload, RestoreError, SessionSnapshot};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{
    AssessmentEvent, AssessmentStage, FlowAction, FlowDefinition, FlowEngine, FlowTransitionError,
    StepContext, TradeInFlow, TransitionOutcome,
};
pub use questions::{default_question_set, ConditionQuestion, QuestionOption};
pub use quote::{
    assess_readiness, compute_quote, compute_quote_with_trace, DeterministicQuoteEngine,
    DeterministicQuoteRuntime, DeterministicReadinessCheck, QuoteEngine, QuoteEvaluation,
    QuoteEvaluationInput, QuoteResult, QuoteRuntime, QuoteTrace, ReadinessCheck, ReadinessInput,
    ReadinessResult, ReadinessViolation, TracedQuote,
};
