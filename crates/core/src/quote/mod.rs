pub mod calculator;
pub mod preconditions;

use serde::{Deserialize, Serialize};

use crate::domain::assessment::AssessmentSession;
use crate::questions::ConditionQuestion;

pub use self::calculator::{
    compute_quote, compute_quote_with_trace, pickup_charge, processing_fee,
    DeterministicQuoteEngine, QuoteEngine, QuoteResult, QuoteTrace, QuoteTraceStep, TracedQuote,
};
pub use self::preconditions::{
    assess_readiness, DeterministicReadinessCheck, ReadinessCheck, ReadinessInput,
    ReadinessResult, ReadinessViolation,
};

#[derive(Clone, Debug)]
pub struct QuoteEvaluationInput<'a> {
    pub session: &'a AssessmentSession,
    pub questions: &'a [ConditionQuestion],
}

/// Readiness plus pricing in one pass. `pricing` is only populated when
/// every precondition holds — a not-ready session is never priced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub readiness: ReadinessResult,
    pub pricing: Option<QuoteResult>,
}

pub trait QuoteRuntime: Send + Sync {
    fn evaluate(&self, input: QuoteEvaluationInput<'_>) -> QuoteEvaluation;
}

pub struct DeterministicQuoteRuntime<R, E> {
    readiness_check: R,
    quote_engine: E,
}

impl<R, E> DeterministicQuoteRuntime<R, E> {
    pub fn new(readiness_check: R, quote_engine: E) -> Self {
        Self { readiness_check, quote_engine }
    }
}

impl Default for DeterministicQuoteRuntime<DeterministicReadinessCheck, DeterministicQuoteEngine> {
    fn default() -> Self {
        Self::new(DeterministicReadinessCheck, DeterministicQuoteEngine)
    }
}

impl<R, E> QuoteRuntime for DeterministicQuoteRuntime<R, E>
where
    R: ReadinessCheck,
    E: QuoteEngine,
{
    fn evaluate(&self, input: QuoteEvaluationInput<'_>) -> QuoteEvaluation {
        let readiness = self
            .readiness_check
            .assess(&ReadinessInput { session: input.session, questions: input.questions });

        let pricing = readiness
            .ready
            .then(|| self.quote_engine.quote(input.session.base_price, input.session));

        QuoteEvaluation { readiness, pricing }
    }
}
