use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::assessment::AssessmentSession;
use crate::flows::states::{
    AssessmentEvent, AssessmentStage, FlowAction, StepContext, TransitionOutcome,
};
use crate::quote::{QuoteEngine, QuoteResult};

pub trait FlowDefinition {
    fn initial_stage(&self) -> AssessmentStage;
    fn transition(
        &self,
        current: &AssessmentStage,
        event: &AssessmentEvent,
        context: &StepContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// The customer-facing sell-my-device flow: variant pick, condition
/// questions, defects, accessories, quote. Forward-only; re-committing an
/// earlier step merges into the retained session and the flow resumes from
/// the furthest stage already reached.
#[derive(Clone, Debug, Default)]
pub struct TradeInFlow;

impl FlowDefinition for TradeInFlow {
    fn initial_stage(&self) -> AssessmentStage {
        AssessmentStage::Started
    }

    fn transition(
        &self,
        current: &AssessmentStage,
        event: &AssessmentEvent,
        context: &StepContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_trade_in(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_stage(&self) -> AssessmentStage {
        self.flow.initial_stage()
    }

    pub fn apply(
        &self,
        current: &AssessmentStage,
        event: &AssessmentEvent,
        context: &StepContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &AssessmentStage,
        event: &AssessmentEvent,
        context: &StepContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit.session_id.clone(),
                        audit.correlation_id.clone(),
                        "flow.transition_applied",
                        AuditCategory::Flow,
                        audit.actor.clone(),
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit.session_id.clone(),
                        audit.correlation_id.clone(),
                        "flow.transition_rejected",
                        AuditCategory::Flow,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }

    pub fn quote<E>(&self, engine: &E, session: &AssessmentSession) -> QuoteResult
    where
        E: QuoteEngine,
    {
        engine.quote(session.base_price, session)
    }

    pub fn quote_with_audit<E, S>(
        &self,
        engine: &E,
        session: &AssessmentSession,
        sink: &S,
        audit: &AuditContext,
    ) -> QuoteResult
    where
        E: QuoteEngine,
        S: AuditSink,
    {
        let result = self.quote(engine, session);
        sink.emit(
            AuditEvent::new(
                audit.session_id.clone(),
                audit.correlation_id.clone(),
                "quote.computed",
                AuditCategory::Pricing,
                audit.actor.clone(),
                AuditOutcome::Success,
            )
            .with_metadata("variant_id", session.variant_id.0.clone())
            .with_metadata("quoted_price", result.quoted_price.to_string())
            .with_metadata("total_amount", result.total_amount.to_string()),
        );
        result
    }
}

impl Default for FlowEngine<TradeInFlow> {
    fn default() -> Self {
        Self::new(TradeInFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("missing requirements before leaving {stage:?}: {missing:?}")]
    MissingRequirements { stage: AssessmentStage, missing: Vec<String> },
    #[error("{event:?} requires reaching {required:?} but the session is at {stage:?}")]
    MissingUpstreamContext {
        stage: AssessmentStage,
        required: AssessmentStage,
        event: AssessmentEvent,
    },
}

impl FlowTransitionError {
    /// The earliest incomplete stage the user must be sent back to; its
    /// `step_name` is the screen to render.
    pub fn resume_stage(&self) -> AssessmentStage {
        match self {
            Self::MissingRequirements { stage, .. }
            | Self::MissingUpstreamContext { stage, .. } => *stage,
        }
    }
}

fn transition_trade_in(
    current: &AssessmentStage,
    event: &AssessmentEvent,
    context: &StepContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use AssessmentEvent::{
        AccessoriesCommitted, ConditionCommitted, DefectsCommitted, QuoteRequested, VariantChosen,
    };
    use AssessmentStage::{
        AccessoriesSelected, ConditionAnswered, DefectsSelected, Quoted, Started, VariantSelected,
    };
    use FlowAction::{
        CollectAccessories, CollectConditionAnswers, CollectDefects, ComputeQuote,
        CreateOfferSession,
    };

    let (to, actions) = match event {
        VariantChosen => {
            if *current == Started {
                (VariantSelected, vec![CollectConditionAnswers])
            } else {
                // Re-picking a variant merges new variant data only;
                // progress and other steps' selections are retained.
                (*current, Vec::new())
            }
        }
        ConditionCommitted => {
            ensure_reached(current, VariantSelected, event)?;
            ensure_requirements_met(current, context)?;
            ((*current).max(ConditionAnswered), vec![CollectDefects])
        }
        DefectsCommitted => {
            ensure_reached(current, ConditionAnswered, event)?;
            ensure_requirements_met(current, context)?;
            ((*current).max(DefectsSelected), vec![CollectAccessories])
        }
        AccessoriesCommitted => {
            ensure_reached(current, DefectsSelected, event)?;
            ((*current).max(AccessoriesSelected), vec![ComputeQuote])
        }
        QuoteRequested => {
            ensure_reached(current, AccessoriesSelected, event)?;
            (Quoted, vec![ComputeQuote, CreateOfferSession])
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

fn ensure_reached(
    current: &AssessmentStage,
    required: AssessmentStage,
    event: &AssessmentEvent,
) -> Result<(), FlowTransitionError> {
    if *current >= required {
        return Ok(());
    }

    Err(FlowTransitionError::MissingUpstreamContext { stage: *current, required, event: *event })
}

fn ensure_requirements_met(
    current: &AssessmentStage,
    context: &StepContext,
) -> Result<(), FlowTransitionError> {
    if context.missing_requirements.is_empty() {
        return Ok(());
    }

    Err(FlowTransitionError::MissingRequirements {
        stage: *current,
        missing: context.missing_requirements.clone(),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::domain::assessment::{AssessmentSession, Defect, NO_DEFECTS};
    use crate::domain::delta::Delta;
    use crate::domain::product::{ProductId, Variant, VariantId};
    use crate::flows::engine::{FlowEngine, FlowTransitionError, TradeInFlow};
    use crate::flows::states::{AssessmentEvent, AssessmentStage, FlowAction, StepContext};
    use crate::quote::DeterministicQuoteEngine;

    #[test]
    fn happy_path_reaches_quoted() {
        let engine = FlowEngine::new(TradeInFlow);
        let context = StepContext::default();
        let mut stage = engine.initial_stage();

        for event in [
            AssessmentEvent::VariantChosen,
            AssessmentEvent::ConditionCommitted,
            AssessmentEvent::DefectsCommitted,
            AssessmentEvent::AccessoriesCommitted,
        ] {
            stage = engine.apply(&stage, &event, &context).expect("forward transition").to;
        }
        assert_eq!(stage, AssessmentStage::AccessoriesSelected);

        let quoted = engine
            .apply(&stage, &AssessmentEvent::QuoteRequested, &context)
            .expect("accessories -> quoted");
        assert_eq!(quoted.to, AssessmentStage::Quoted);
        assert_eq!(
            quoted.actions,
            vec![FlowAction::ComputeQuote, FlowAction::CreateOfferSession]
        );
    }

    #[test]
    fn committing_defects_before_conditions_fails_closed() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(
                &AssessmentStage::VariantSelected,
                &AssessmentEvent::DefectsCommitted,
                &StepContext::default(),
            )
            .expect_err("defects need answered conditions first");

        assert!(matches!(error, FlowTransitionError::MissingUpstreamContext { .. }));
        assert_eq!(error.resume_stage(), AssessmentStage::VariantSelected);
        assert_eq!(error.resume_stage().step_name(), "condition questions");
    }

    #[test]
    fn fresh_session_redirects_to_variant_selection() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(
                &AssessmentStage::Started,
                &AssessmentEvent::QuoteRequested,
                &StepContext::default(),
            )
            .expect_err("nothing committed yet");

        assert_eq!(error.resume_stage().step_name(), "variant selection");
    }

    #[test]
    fn unanswered_required_questions_are_rejected() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(
                &AssessmentStage::VariantSelected,
                &AssessmentEvent::ConditionCommitted,
                &StepContext {
                    missing_requirements: vec![
                        "screen-condition".to_owned(),
                        "body-condition".to_owned(),
                    ],
                },
            )
            .expect_err("must reject unanswered questions");

        assert!(matches!(error, FlowTransitionError::MissingRequirements { .. }));
    }

    #[test]
    fn recommitting_an_earlier_step_retains_progress() {
        let engine = FlowEngine::default();

        let outcome = engine
            .apply(
                &AssessmentStage::AccessoriesSelected,
                &AssessmentEvent::ConditionCommitted,
                &StepContext::default(),
            )
            .expect("back navigation re-commit");

        assert_eq!(outcome.to, AssessmentStage::AccessoriesSelected);
    }

    #[test]
    fn repicking_a_variant_mid_flow_keeps_the_stage() {
        let engine = FlowEngine::default();

        let outcome = engine
            .apply(
                &AssessmentStage::DefectsSelected,
                &AssessmentEvent::VariantChosen,
                &StepContext::default(),
            )
            .expect("variant re-pick");

        assert_eq!(outcome.to, AssessmentStage::DefectsSelected);
        assert!(outcome.actions.is_empty());
    }

    #[test]
    fn quote_can_be_rerequested_from_quoted() {
        let engine = FlowEngine::default();

        let outcome = engine
            .apply(
                &AssessmentStage::Quoted,
                &AssessmentEvent::QuoteRequested,
                &StepContext::default(),
            )
            .expect("recalculate affordance");

        assert_eq!(outcome.to, AssessmentStage::Quoted);
        assert!(outcome.actions.contains(&FlowAction::ComputeQuote));
    }

    #[test]
    fn replay_is_deterministic_for_same_event_sequence() {
        let engine = FlowEngine::default();
        let events = [
            AssessmentEvent::VariantChosen,
            AssessmentEvent::ConditionCommitted,
            AssessmentEvent::DefectsCommitted,
            AssessmentEvent::AccessoriesCommitted,
            AssessmentEvent::QuoteRequested,
        ];

        let run = |engine: &FlowEngine<TradeInFlow>| {
            let mut stage = engine.initial_stage();
            let mut actions = Vec::new();
            for event in &events {
                let outcome = engine
                    .apply(&stage, event, &StepContext::default())
                    .expect("deterministic run");
                actions.push(outcome.actions);
                stage = outcome.to;
            }
            (stage, actions)
        };

        assert_eq!(run(&engine), run(&engine));
    }

    #[test]
    fn flow_engine_prices_a_session_through_the_quote_engine() {
        let engine = FlowEngine::default();
        let mut session = AssessmentSession::new(
            ProductId("galaxy-s21".to_owned()),
            &Variant {
                id: VariantId("galaxy-s21-128".to_owned()),
                label: "8 GB / 128 GB".to_owned(),
                base_price: Decimal::from(45_000),
            },
        );
        session.select_defect(Defect {
            id: NO_DEFECTS.to_owned(),
            label: "No defects".to_owned(),
            category: "none".to_owned(),
            delta: Delta::zero(),
        });

        let result = engine.quote(&DeterministicQuoteEngine, &session);
        assert_eq!(result.quoted_price, Decimal::from(45_000));
        assert_eq!(result.total_amount, Decimal::from(44_951));
    }

    #[test]
    fn flow_transition_emits_audit_event() {
        let engine = FlowEngine::default();
        let sink = InMemoryAuditSink::default();

        let _ = engine
            .apply_with_audit(
                &AssessmentStage::Started,
                &AssessmentEvent::VariantChosen,
                &StepContext::default(),
                &sink,
                &AuditContext::new(None, "req-42", "flow-engine"),
            )
            .expect("transition should succeed");

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "req-42");
        assert_eq!(events[0].event_type, "flow.transition_applied");
    }
}
