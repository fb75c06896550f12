use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;
use tradein_core::config::CatalogConfig;
use tradein_core::{
    default_question_set, CategoryId, ConditionQuestion, Delta, QuestionId, QuestionOption,
};

use crate::error::ServiceError;

#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Condition questions for a product category, flattened from the
    /// collaborator's section grouping.
    async fn questions_for(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<ConditionQuestion>, ServiceError>;
}

pub struct HttpQuestionService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuestionService {
    pub fn new(config: &CatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, base_url: config.base_url.trim_end_matches('/').to_owned() }
    }
}

/// Wire shape: questions arrive grouped by section.
#[derive(Debug, Deserialize)]
struct SectionDto {
    section: String,
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    id: String,
    text: String,
    #[serde(default = "default_required")]
    required: bool,
    options: Vec<OptionDto>,
}

#[derive(Debug, Deserialize)]
struct OptionDto {
    value: String,
    label: String,
    #[serde(default)]
    delta: Delta,
}

fn default_required() -> bool {
    true
}

fn flatten_sections(sections: Vec<SectionDto>) -> Vec<ConditionQuestion> {
    sections
        .into_iter()
        .flat_map(|section| {
            let section_name = section.section;
            section
                .questions
                .into_iter()
                .map(move |question| ConditionQuestion {
                    id: QuestionId(question.id),
                    section: section_name.clone(),
                    prompt: question.text,
                    required: question.required,
                    options: question
                        .options
                        .into_iter()
                        .map(|option| QuestionOption {
                            id: option.value,
                            label: option.label,
                            delta: option.delta,
                        })
                        .collect(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[async_trait]
impl QuestionService for HttpQuestionService {
    async fn questions_for(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<ConditionQuestion>, ServiceError> {
        let endpoint = format!("{}/categories/{}/questions", self.base_url, category.0);

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { endpoint: endpoint.clone(), source })?;

        if !response.status().is_success() {
            return Err(ServiceError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let sections: Vec<SectionDto> = response
            .json()
            .await
            .map_err(|source| ServiceError::Decode { endpoint: endpoint.clone(), source })?;

        Ok(flatten_sections(sections))
    }
}

/// Degrades to the built-in default question set when the inner service
/// errors or returns an empty set, so a collaborator outage never blocks
/// the flow.
pub struct FallbackQuestionService<S> {
    inner: S,
}

impl<S> FallbackQuestionService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> QuestionService for FallbackQuestionService<S>
where
    S: QuestionService,
{
    async fn questions_for(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<ConditionQuestion>, ServiceError> {
        match self.inner.questions_for(category).await {
            Ok(questions) if !questions.is_empty() => Ok(questions),
            Ok(_) => {
                warn!(
                    event_name = "questions.fallback_engaged",
                    category = %category.0,
                    reason = "empty_question_set",
                    "question collaborator returned no questions; using the default set"
                );
                Ok(default_question_set())
            }
            Err(error) => {
                warn!(
                    event_name = "questions.fallback_engaged",
                    category = %category.0,
                    reason = "fetch_failed",
                    error = %error,
                    "question collaborator unreachable; using the default set"
                );
                Ok(default_question_set())
            }
        }
    }
}

/// Fixture-backed question service for tests and local development.
#[derive(Default)]
pub struct InMemoryQuestionService {
    questions: Vec<ConditionQuestion>,
    fail: bool,
}

impl InMemoryQuestionService {
    pub fn with_questions(questions: Vec<ConditionQuestion>) -> Self {
        Self { questions, fail: false }
    }

    pub fn failing() -> Self {
        Self { questions: Vec::new(), fail: true }
    }
}

#[async_trait]
impl QuestionService for InMemoryQuestionService {
    async fn questions_for(
        &self,
        _category: &CategoryId,
    ) -> Result<Vec<ConditionQuestion>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Status {
                endpoint: "in-memory://questions".to_owned(),
                status: 503,
            });
        }
        Ok(self.questions.clone())
    }
}

#[cfg(test)]
mod tests {
    use tradein_core::{default_question_set, CategoryId};

    use super::{
        flatten_sections, FallbackQuestionService, InMemoryQuestionService, QuestionService,
        SectionDto,
    };

    fn category() -> CategoryId {
        CategoryId("mobile".to_owned())
    }

    #[tokio::test]
    async fn fallback_engages_on_fetch_failure() {
        let service = FallbackQuestionService::new(InMemoryQuestionService::failing());

        let questions = service.questions_for(&category()).await.expect("fallback never errors");
        assert_eq!(questions, default_question_set());
    }

    #[tokio::test]
    async fn fallback_engages_on_empty_set() {
        let service = FallbackQuestionService::new(InMemoryQuestionService::default());

        let questions = service.questions_for(&category()).await.expect("fallback never errors");
        assert_eq!(questions, default_question_set());
    }

    #[tokio::test]
    async fn fallback_passes_through_a_real_set() {
        let supplied = vec![default_question_set().remove(0)];
        let service = FallbackQuestionService::new(InMemoryQuestionService::with_questions(
            supplied.clone(),
        ));

        let questions = service.questions_for(&category()).await.expect("inner set passes");
        assert_eq!(questions, supplied);
    }

    #[test]
    fn sections_flatten_into_the_engine_shape() {
        let sections: Vec<SectionDto> = serde_json::from_str(
            r#"[
                {
                    "section": "display",
                    "questions": [
                        {
                            "id": "screen-condition",
                            "text": "What is the condition of the screen?",
                            "options": [
                                {"value": "flawless", "label": "Flawless"},
                                {
                                    "value": "cracked",
                                    "label": "Cracked",
                                    "delta": {"kind": "percent", "sign": "-", "value": "30"}
                                }
                            ]
                        }
                    ]
                }
            ]"#,
        )
        .expect("parse sections");

        let questions = flatten_sections(sections);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].section, "display");
        assert!(questions[0].required, "questions default to required");
        assert_eq!(questions[0].options.len(), 2);
        assert!(questions[0].options[0].delta.is_zero(), "absent delta is the zero delta");
    }
}
