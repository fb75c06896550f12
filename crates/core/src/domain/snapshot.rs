use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::assessment::{Accessory, Answer, AssessmentSession, Defect, QuestionId};
use crate::domain::delta::Delta;
use crate::domain::product::{ProductId, VariantId};

/// The loosely-typed page-to-page payload the session is carried in between
/// steps. Every field is optional: a field a step has not committed yet is
/// simply absent, and rehydration treats it as "not yet answered" rather
/// than inventing a zero-value entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub base_price: Option<Decimal>,
    pub answers: BTreeMap<String, AnswerPayload>,
    pub selected_defects: Vec<Defect>,
    pub selected_accessories: Vec<Accessory>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Answers arrive in two historical shapes: a detailed object carrying the
/// chosen option and its delta, or a legacy bare option-id string. Both
/// normalize into [`Answer`] at this boundary so the calculator only ever
/// sees one shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerPayload {
    Detailed {
        selected_option_id: String,
        #[serde(default)]
        delta: Delta,
    },
    Legacy(String),
}

impl AnswerPayload {
    fn normalize(&self, question_id: QuestionId) -> Answer {
        match self {
            Self::Detailed { selected_option_id, delta } => Answer {
                question_id,
                selected_option_id: selected_option_id.clone(),
                delta: *delta,
            },
            Self::Legacy(option_id) => Answer {
                question_id,
                selected_option_id: option_id.clone(),
                delta: Delta::zero(),
            },
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RestoreError {
    #[error("snapshot is missing upstream context: `{field}` has not been committed")]
    MissingContext { field: &'static str },
}

impl SessionSnapshot {
    /// Rehydrates a full session. Fails closed when the variant step has not
    /// committed its fields yet; downstream steps are free to be absent.
    pub fn restore(&self) -> Result<AssessmentSession, RestoreError> {
        let product_id = self
            .product_id
            .as_ref()
            .ok_or(RestoreError::MissingContext { field: "product_id" })?;
        let variant_id = self
            .variant_id
            .as_ref()
            .ok_or(RestoreError::MissingContext { field: "variant_id" })?;
        let base_price =
            self.base_price.ok_or(RestoreError::MissingContext { field: "base_price" })?;

        let answers = self
            .answers
            .iter()
            .map(|(question_id, payload)| {
                let question_id = QuestionId(question_id.clone());
                (question_id.clone(), payload.normalize(question_id))
            })
            .collect();

        Ok(AssessmentSession {
            product_id: ProductId(product_id.clone()),
            variant_id: VariantId(variant_id.clone()),
            base_price,
            answers,
            selected_defects: self.selected_defects.clone(),
            selected_accessories: self.selected_accessories.clone(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}

impl From<&AssessmentSession> for SessionSnapshot {
    fn from(session: &AssessmentSession) -> Self {
        Self {
            product_id: Some(session.product_id.0.clone()),
            variant_id: Some(session.variant_id.0.clone()),
            base_price: Some(session.base_price),
            answers: session
                .answers
                .iter()
                .map(|(question_id, answer)| {
                    (
                        question_id.0.clone(),
                        AnswerPayload::Detailed {
                            selected_option_id: answer.selected_option_id.clone(),
                            delta: answer.delta,
                        },
                    )
                })
                .collect(),
            selected_defects: session.selected_defects.clone(),
            selected_accessories: session.selected_accessories.clone(),
            created_at: Some(session.created_at),
        }
    }
}
