use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::assessment::{Answer, QuestionId};
use crate::domain::delta::{Delta, DeltaSign};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    pub delta: Delta,
}

/// A condition question in the flattened shape the engine consumes:
/// collaborator payloads group questions by section, ingestion flattens them
/// into this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionQuestion {
    pub id: QuestionId,
    pub section: String,
    pub prompt: String,
    pub required: bool,
    pub options: Vec<QuestionOption>,
}

impl ConditionQuestion {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    /// Builds the normalized answer for a chosen option, binding the option's
    /// delta. Returns `None` for an option id this question does not offer.
    pub fn answer_with(&self, option_id: &str) -> Option<Answer> {
        self.option(option_id).map(|option| Answer {
            question_id: self.id.clone(),
            selected_option_id: option.id.clone(),
            delta: option.delta,
        })
    }
}

/// The hard-coded fallback used when the question collaborator is down or
/// returns an empty set, so the flow is never blocked on an outage.
pub fn default_question_set() -> Vec<ConditionQuestion> {
    vec![
        question(
            "screen-condition",
            "display",
            "What is the condition of the screen?",
            vec![
                option("flawless", "Flawless, no visible marks", Delta::zero()),
                option("minor-scratches", "Minor scratches", percent_off(5)),
                option("heavy-scratches", "Heavy scratches or scuffs", percent_off(15)),
                option("cracked", "Cracked or chipped glass", percent_off(30)),
            ],
        ),
        question(
            "body-condition",
            "body",
            "What is the condition of the body?",
            vec![
                option("like-new", "Like new", Delta::zero()),
                option("light-wear", "Light wear and tear", percent_off(5)),
                option("dented", "Dents or major wear", percent_off(12)),
            ],
        ),
        question(
            "functional-state",
            "functional",
            "Is the device fully functional?",
            vec![
                option("fully-working", "Everything works", Delta::zero()),
                option("minor-issues", "Minor issues (speaker, vibration)", percent_off(10)),
                option("major-issues", "Major issues (calls, charging)", percent_off(35)),
            ],
        ),
        question(
            "accessories-completeness",
            "accessories",
            "Do you have the original box and accessories?",
            vec![
                option("complete", "Box and all accessories", Delta::zero()),
                option("partial", "Some accessories", percent_off(3)),
                option("device-only", "Device only", percent_off(6)),
            ],
        ),
    ]
}

fn question(
    id: &str,
    section: &str,
    prompt: &str,
    options: Vec<QuestionOption>,
) -> ConditionQuestion {
    ConditionQuestion {
        id: QuestionId(id.to_owned()),
        section: section.to_owned(),
        prompt: prompt.to_owned(),
        required: true,
        options,
    }
}

fn option(id: &str, label: &str, delta: Delta) -> QuestionOption {
    QuestionOption { id: id.to_owned(), label: label.to_owned(), delta }
}

fn percent_off(value: u32) -> Delta {
    Delta::percent(DeltaSign::Minus, Decimal::from(value))
}

#[cfg(test)]
mod tests {
    use super::default_question_set;

    #[test]
    fn default_set_covers_the_four_fallback_questions() {
        let questions = default_question_set();
        let ids: Vec<&str> = questions.iter().map(|question| question.id.0.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "screen-condition",
                "body-condition",
                "functional-state",
                "accessories-completeness"
            ]
        );
        assert!(questions.iter().all(|question| question.required));
        assert!(questions.iter().all(|question| !question.options.is_empty()));
    }

    #[test]
    fn answer_with_binds_the_options_delta() {
        let questions = default_question_set();
        let screen = &questions[0];

        let answer = screen.answer_with("cracked").expect("cracked is an offered option");
        assert_eq!(answer.selected_option_id, "cracked");
        assert!(!answer.delta.is_zero());

        assert!(screen.answer_with("not-an-option").is_none());
    }
}
