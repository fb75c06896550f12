use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::assessment::AssessmentSession;
use crate::domain::delta::{Delta, DeltaKind};
use crate::domain::product::VariantId;

pub fn processing_fee() -> Decimal {
    Decimal::from(49)
}

pub fn pickup_charge() -> Decimal {
    Decimal::ZERO
}

/// Final priced outcome of an assessment. `total_amount` is deliberately
/// unclamped: a pathological pile-up of negative deltas can drive it below
/// zero, and callers decide whether to floor it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub quoted_price: Decimal,
    pub processing_fee: Decimal,
    pub pickup_charge: Decimal,
    pub total_amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTrace {
    pub variant_id: VariantId,
    pub steps: Vec<QuoteTraceStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedQuote {
    pub result: QuoteResult,
    pub trace: QuoteTrace,
}

pub trait QuoteEngine: Send + Sync {
    fn quote(&self, base_price: Decimal, session: &AssessmentSession) -> QuoteResult;
}

#[derive(Default)]
pub struct DeterministicQuoteEngine;

impl QuoteEngine for DeterministicQuoteEngine {
    fn quote(&self, base_price: Decimal, session: &AssessmentSession) -> QuoteResult {
        compute_quote(base_price, session)
    }
}

/// Folds every delta from answers, defects, and accessories into two pools,
/// applies the percent pool multiplicatively and the absolute pool flat, and
/// rounds to a whole currency unit. Pure and idempotent: the same session
/// snapshot always prices identically, and iteration order cannot matter
/// because each pool is a commutative sum.
pub fn compute_quote(base_price: Decimal, session: &AssessmentSession) -> QuoteResult {
    let (percent_pool, absolute_pool) = fold_deltas(session);

    let adjusted = base_price * (Decimal::ONE + percent_pool / Decimal::ONE_HUNDRED)
        + absolute_pool;
    let quoted_price = round_to_unit(adjusted);
    let processing_fee = processing_fee();
    let pickup_charge = pickup_charge();

    QuoteResult {
        quoted_price,
        processing_fee,
        pickup_charge,
        total_amount: quoted_price - processing_fee - pickup_charge,
    }
}

pub fn compute_quote_with_trace(base_price: Decimal, session: &AssessmentSession) -> TracedQuote {
    let (percent_pool, absolute_pool) = fold_deltas(session);
    let result = compute_quote(base_price, session);

    let steps = vec![
        QuoteTraceStep {
            stage: "base_price".to_owned(),
            detail: "variant base price".to_owned(),
            amount: base_price,
        },
        QuoteTraceStep {
            stage: "percent_pool".to_owned(),
            detail: format!("net percent adjustment {percent_pool}%"),
            amount: base_price * percent_pool / Decimal::ONE_HUNDRED,
        },
        QuoteTraceStep {
            stage: "absolute_pool".to_owned(),
            detail: "net flat adjustment".to_owned(),
            amount: absolute_pool,
        },
        QuoteTraceStep {
            stage: "quoted_price".to_owned(),
            detail: "rounded half away from zero to a whole unit".to_owned(),
            amount: result.quoted_price,
        },
        QuoteTraceStep {
            stage: "processing_fee".to_owned(),
            detail: "fixed processing fee".to_owned(),
            amount: -result.processing_fee,
        },
        QuoteTraceStep {
            stage: "pickup_charge".to_owned(),
            detail: "pickup charge".to_owned(),
            amount: -result.pickup_charge,
        },
        QuoteTraceStep {
            stage: "total_amount".to_owned(),
            detail: "amount paid out".to_owned(),
            amount: result.total_amount,
        },
    ];

    TracedQuote { result, trace: QuoteTrace { variant_id: session.variant_id.clone(), steps } }
}

fn fold_deltas(session: &AssessmentSession) -> (Decimal, Decimal) {
    let mut percent_pool = Decimal::ZERO;
    let mut absolute_pool = Decimal::ZERO;

    let deltas = session
        .answers
        .values()
        .map(|answer| &answer.delta)
        .chain(session.selected_defects.iter().map(|defect| &defect.delta))
        .chain(session.selected_accessories.iter().map(|accessory| &accessory.delta));

    for delta in deltas {
        fold_delta(delta, &mut percent_pool, &mut absolute_pool);
    }

    (percent_pool, absolute_pool)
}

fn fold_delta(delta: &Delta, percent_pool: &mut Decimal, absolute_pool: &mut Decimal) {
    match delta.kind {
        DeltaKind::Percent => *percent_pool += delta.signed_value(),
        DeltaKind::Absolute => *absolute_pool += delta.signed_value(),
    }
}

fn round_to_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::assessment::{Accessory, Answer, AssessmentSession, Defect, QuestionId};
    use crate::domain::delta::{Delta, DeltaSign};
    use crate::domain::product::{ProductId, Variant, VariantId};

    use super::{compute_quote, compute_quote_with_trace, DeterministicQuoteEngine, QuoteEngine};

    fn session() -> AssessmentSession {
        AssessmentSession::new(
            ProductId("galaxy-s21".to_owned()),
            &Variant {
                id: VariantId("galaxy-s21-128".to_owned()),
                label: "8 GB / 128 GB".to_owned(),
                base_price: Decimal::from(45_000),
            },
        )
    }

    fn answer(question_id: &str, delta: Delta) -> Answer {
        Answer {
            question_id: QuestionId(question_id.to_owned()),
            selected_option_id: format!("{question_id}-option"),
            delta,
        }
    }

    fn defect(id: &str, delta: Delta) -> Defect {
        Defect { id: id.to_owned(), label: id.to_owned(), category: "screen".to_owned(), delta }
    }

    fn accessory(id: &str, delta: Delta) -> Accessory {
        Accessory { id: id.to_owned(), label: id.to_owned(), delta }
    }

    #[test]
    fn untouched_session_quotes_the_base_price() {
        let session = session();
        let result = compute_quote(session.base_price, &session);

        assert_eq!(result.quoted_price, Decimal::from(45_000));
        assert_eq!(result.processing_fee, Decimal::from(49));
        assert_eq!(result.pickup_charge, Decimal::ZERO);
        assert_eq!(result.total_amount, Decimal::from(44_951));
    }

    #[test]
    fn single_percent_answer_scales_the_base_price() {
        let mut session = session();
        session.record_answer(answer(
            "screen-condition",
            Delta::percent(DeltaSign::Minus, Decimal::from(10)),
        ));

        let result = compute_quote(session.base_price, &session);
        assert_eq!(result.quoted_price, Decimal::from(40_500));
        assert_eq!(result.total_amount, Decimal::from(40_451));
    }

    #[test]
    fn absolute_deltas_apply_after_the_percent_pool() {
        let mut session = session();
        session.select_defect(defect(
            "cracked-screen",
            Delta::absolute(DeltaSign::Minus, Decimal::from(2_000)),
        ));
        session.select_accessory(accessory(
            "charger",
            Delta::absolute(DeltaSign::Plus, Decimal::from(500)),
        ));

        let result = compute_quote(session.base_price, &session);
        assert_eq!(result.quoted_price, Decimal::from(43_500));
    }

    #[test]
    fn percent_pool_nets_before_applying() {
        let mut session = session();
        session.record_answer(answer(
            "screen-condition",
            Delta::percent(DeltaSign::Minus, Decimal::from(10)),
        ));
        session.record_answer(answer(
            "body-condition",
            Delta::percent(DeltaSign::Plus, Decimal::from(5)),
        ));
        session.select_defect(defect(
            "scuffed-frame",
            Delta::absolute(DeltaSign::Minus, Decimal::from(300)),
        ));

        let result = compute_quote(session.base_price, &session);
        assert_eq!(result.quoted_price, Decimal::from(42_450));
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut session = session();
        session.record_answer(answer(
            "functional-state",
            Delta::percent(DeltaSign::Minus, Decimal::from(35)),
        ));

        let first = compute_quote(session.base_price, &session);
        let second = compute_quote(session.base_price, &session);
        assert_eq!(first, second);
    }

    #[test]
    fn any_partition_of_the_same_deltas_prices_identically() {
        let percent = Delta::percent(DeltaSign::Minus, Decimal::from(10));
        let flat_down = Delta::absolute(DeltaSign::Minus, Decimal::from(2_000));
        let flat_up = Delta::absolute(DeltaSign::Plus, Decimal::from(500));

        // All three deltas as answers.
        let mut as_answers = session();
        as_answers.record_answer(answer("q1", percent));
        as_answers.record_answer(answer("q2", flat_down));
        as_answers.record_answer(answer("q3", flat_up));

        // Same deltas spread across the three pools.
        let mut spread = session();
        spread.record_answer(answer("q1", percent));
        spread.select_defect(defect("d1", flat_down));
        spread.select_accessory(accessory("a1", flat_up));

        assert_eq!(
            compute_quote(as_answers.base_price, &as_answers).quoted_price,
            compute_quote(spread.base_price, &spread).quoted_price,
        );
    }

    #[test]
    fn accessory_sign_is_honored_not_assumed() {
        let mut session = session();
        session.select_accessory(accessory(
            "damaged-box",
            Delta::absolute(DeltaSign::Minus, Decimal::from(250)),
        ));

        let result = compute_quote(session.base_price, &session);
        assert_eq!(result.quoted_price, Decimal::from(44_750));
    }

    #[test]
    fn totals_are_not_clamped_at_zero() {
        let mut session = session();
        session.base_price = Decimal::from(20);
        session.select_defect(defect(
            "cracked-screen",
            Delta::absolute(DeltaSign::Minus, Decimal::from(2_000)),
        ));

        let result = compute_quote(session.base_price, &session);
        assert_eq!(result.quoted_price, Decimal::from(-1_980));
        assert_eq!(result.total_amount, Decimal::from(-2_029));
    }

    #[test]
    fn fractional_results_round_half_away_from_zero() {
        let mut session = session();
        session.base_price = Decimal::from(101);
        session.record_answer(answer(
            "screen-condition",
            Delta::percent(DeltaSign::Minus, Decimal::from(50)),
        ));

        // 101 * 0.5 = 50.5 rounds to 51, not 50.
        let result = compute_quote(session.base_price, &session);
        assert_eq!(result.quoted_price, Decimal::from(51));
    }

    #[test]
    fn trace_walks_from_base_price_to_total() {
        let mut session = session();
        session.record_answer(answer(
            "screen-condition",
            Delta::percent(DeltaSign::Minus, Decimal::from(10)),
        ));

        let traced = compute_quote_with_trace(session.base_price, &session);
        assert_eq!(traced.result, compute_quote(session.base_price, &session));
        assert_eq!(traced.trace.variant_id, session.variant_id);

        let stages: Vec<&str> =
            traced.trace.steps.iter().map(|step| step.stage.as_str()).collect();
        assert_eq!(
            stages,
            vec![
                "base_price",
                "percent_pool",
                "absolute_pool",
                "quoted_price",
                "processing_fee",
                "pickup_charge",
                "total_amount"
            ]
        );
    }

    #[test]
    fn engine_trait_matches_the_free_function() {
        let mut session = session();
        session.record_answer(answer(
            "body-condition",
            Delta::percent(DeltaSign::Minus, Decimal::from(12)),
        ));

        let engine = DeterministicQuoteEngine;
        assert_eq!(
            engine.quote(session.base_price, &session),
            compute_quote(session.base_price, &session)
        );
    }
}
