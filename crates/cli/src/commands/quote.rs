use std::fs;
use std::path::Path;

use serde::Serialize;
use tradein_core::quote::{QuoteResult, QuoteTrace};
use tradein_core::{
    assess_readiness, compute_quote_with_trace, default_question_set, AuditContext,
    DeterministicQuoteEngine, FlowEngine, ReadinessInput, SessionSnapshot, TracingAuditSink,
};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct QuoteReport {
    command: &'static str,
    status: &'static str,
    result: QuoteResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<QuoteTrace>,
}

pub fn run(session_path: &Path, show_trace: bool, json_output: bool) -> CommandResult {
    let raw = match fs::read_to_string(session_path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "session_file",
                format!("could not read `{}`: {error}", session_path.display()),
                1,
            )
        }
    };

    let snapshot: SessionSnapshot = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "session_parse",
                format!("could not parse session snapshot: {error}"),
                1,
            )
        }
    };

    let session = match snapshot.restore() {
        Ok(session) => session,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "missing_context",
                format!("{error}; return to variant selection"),
                2,
            )
        }
    };

    // The operator tool prices offline, so readiness is judged against the
    // built-in default question set.
    let questions = default_question_set();
    let readiness = assess_readiness(&ReadinessInput { session: &session, questions: &questions });
    if !readiness.ready {
        let resume = readiness
            .earliest_incomplete_stage()
            .map(|stage| stage.step_name())
            .unwrap_or("variant selection");
        return CommandResult::failure(
            "quote",
            "not_ready",
            format!(
                "assessment is incomplete ({}); return to {resume}",
                readiness.missing_requirements().join(", ")
            ),
            2,
        );
    }

    let engine = FlowEngine::default();
    let result = engine.quote_with_audit(
        &DeterministicQuoteEngine,
        &session,
        &TracingAuditSink,
        &AuditContext::new(None, "cli", "tradein-cli"),
    );
    let trace =
        show_trace.then(|| compute_quote_with_trace(session.base_price, &session).trace);

    if json_output {
        let report = QuoteReport { command: "quote", status: "ok", result, trace };
        let output = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}"));
        return CommandResult { exit_code: 0, output };
    }

    let mut lines = vec![
        format!("quoted price   : {}", result.quoted_price),
        format!("processing fee : {}", result.processing_fee),
        format!("pickup charge  : {}", result.pickup_charge),
        format!("total payout   : {}", result.total_amount),
    ];

    if let Some(trace) = trace {
        lines.push(String::new());
        lines.push(format!("trace for variant {}:", trace.variant_id.0));
        for step in &trace.steps {
            lines.push(format!(
                "- {:<15} {:>12}  {}",
                step.stage,
                step.amount.to_string(),
                step.detail
            ));
        }
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}
