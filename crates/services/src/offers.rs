use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;
use tradein_core::config::OffersConfig;
use tradein_core::{AssessmentSession, ProductId, VariantId};

use crate::error::ServiceError;

/// What the offer collaborator needs to open a session: the assessment's
/// identifiers plus the selected ids, not the priced amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSessionRequest {
    pub user_id: String,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub answers: Vec<AnswerSummary>,
    #[serde(rename = "defects")]
    pub defect_ids: Vec<String>,
    #[serde(rename = "accessories")]
    pub accessory_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSummary {
    pub question_id: String,
    pub selected_option_id: String,
}

impl OfferSessionRequest {
    pub fn from_session(user_id: impl Into<String>, session: &AssessmentSession) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: session.product_id.clone(),
            variant_id: session.variant_id.clone(),
            answers: session
                .answers
                .values()
                .map(|answer| AnswerSummary {
                    question_id: answer.question_id.0.clone(),
                    selected_option_id: answer.selected_option_id.clone(),
                })
                .collect(),
            defect_ids: session.selected_defects.iter().map(|defect| defect.id.clone()).collect(),
            accessory_ids: session
                .selected_accessories
                .iter()
                .map(|accessory| accessory.id.clone())
                .collect(),
        }
    }
}

/// A partner bonus offer. Display-only: never part of the quote math.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerOffer {
    pub id: String,
    pub brand: String,
    pub percent: Decimal,
    pub tcs: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSession {
    pub session_id: String,
    pub offers: Vec<PartnerOffer>,
}

/// Outcome of offer-session creation as the quote screen consumes it: the
/// local quote renders either way, offers are a bonus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OfferAvailability {
    Available(OfferSession),
    Unavailable,
}

#[async_trait]
pub trait OfferSessionService: Send + Sync {
    async fn create(&self, request: &OfferSessionRequest) -> Result<OfferSession, ServiceError>;
}

pub struct HttpOfferSessionService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpOfferSessionService {
    pub fn new(config: &OffersConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl OfferSessionService for HttpOfferSessionService {
    async fn create(&self, request: &OfferSessionRequest) -> Result<OfferSession, ServiceError> {
        let endpoint = format!("{}/sessions", self.base_url);

        let mut builder = self.client.post(&endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| ServiceError::Transport { endpoint: endpoint.clone(), source })?;

        if !response.status().is_success() {
            return Err(ServiceError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|source| ServiceError::Decode { endpoint, source })
    }
}

/// Creates the offer session without letting a failure block the quote
/// screen: errors are logged and collapse into `Unavailable`. The user can
/// retry; nothing retries automatically.
pub async fn create_or_unavailable<S>(
    service: &S,
    request: &OfferSessionRequest,
) -> OfferAvailability
where
    S: OfferSessionService,
{
    match service.create(request).await {
        Ok(session) => OfferAvailability::Available(session),
        Err(error) => {
            warn!(
                event_name = "offers.session_unavailable",
                endpoint = error.endpoint(),
                error = %error,
                "offer session creation failed; quote display proceeds without offers"
            );
            OfferAvailability::Unavailable
        }
    }
}

/// Fixture-backed offer service for tests and local development.
#[derive(Default)]
pub struct InMemoryOfferSessionService {
    pub offers: Vec<PartnerOffer>,
    pub fail: bool,
}

#[async_trait]
impl OfferSessionService for InMemoryOfferSessionService {
    async fn create(&self, request: &OfferSessionRequest) -> Result<OfferSession, ServiceError> {
        if self.fail {
            return Err(ServiceError::Status {
                endpoint: "in-memory://offers/sessions".to_owned(),
                status: 502,
            });
        }
        Ok(OfferSession {
            session_id: format!("OS-{}-{}", request.product_id.0, request.variant_id.0),
            offers: self.offers.clone(),
        })
    }
}
