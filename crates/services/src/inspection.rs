use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tradein_core::config::CatalogConfig;
use tradein_core::{Accessory, CategoryId, Defect, Delta};

use crate::error::ServiceError;

/// Defects as the collaborator serves them: pre-grouped by device area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefectGroup {
    pub category: String,
    pub defects: Vec<Defect>,
}

#[async_trait]
pub trait InspectionCatalogService: Send + Sync {
    async fn defects_for(&self, category: &CategoryId) -> Result<Vec<DefectGroup>, ServiceError>;
    async fn accessories(&self) -> Result<Vec<Accessory>, ServiceError>;
}

pub struct HttpInspectionCatalogService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInspectionCatalogService {
    pub fn new(config: &CatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, base_url: config.base_url.trim_end_matches('/').to_owned() }
    }

    async fn get_json<T>(&self, endpoint: String) -> Result<T, ServiceError>
    where
        T: serde::de::DeserializeOwned,
    {
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

        response.json().await.map_err(|source| ServiceError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct DefectDto {
    id: String,
    label: String,
    category: String,
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct AccessoryDto {
    id: String,
    label: String,
    #[serde(default)]
    delta: Delta,
}

fn group_defects(defects: Vec<DefectDto>) -> Vec<DefectGroup> {
    let mut groups: Vec<DefectGroup> = Vec::new();
    for dto in defects {
        let defect = Defect {
            id: dto.id,
            label: dto.label,
            category: dto.category.clone(),
            delta: dto.delta,
        };
        match groups.iter_mut().find(|group| group.category == dto.category) {
            Some(group) => group.defects.push(defect),
            None => groups.push(DefectGroup { category: dto.category, defects: vec![defect] }),
        }
    }
    groups
}

#[async_trait]
impl InspectionCatalogService for HttpInspectionCatalogService {
    async fn defects_for(&self, category: &CategoryId) -> Result<Vec<DefectGroup>, ServiceError> {
        let endpoint = format!("{}/categories/{}/defects", self.base_url, category.0);
        let defects: Vec<DefectDto> = self.get_json(endpoint).await?;
        Ok(group_defects(defects))
    }

    async fn accessories(&self) -> Result<Vec<Accessory>, ServiceError> {
        let endpoint = format!("{}/accessories", self.base_url);
        let accessories: Vec<AccessoryDto> = self.get_json(endpoint).await?;
        Ok(accessories
            .into_iter()
            .map(|dto| Accessory { id: dto.id, label: dto.label, delta: dto.delta })
            .collect())
    }
}

/// Fixture-backed inspection catalog for tests and local development.
#[derive(Default)]
pub struct InMemoryInspectionCatalogService {
    pub defect_groups: Vec<DefectGroup>,
    pub accessories: Vec<Accessory>,
}

#[async_trait]
impl InspectionCatalogService for InMemoryInspectionCatalogService {
    async fn defects_for(&self, _category: &CategoryId) -> Result<Vec<DefectGroup>, ServiceError> {
        Ok(self.defect_groups.clone())
    }

    async fn accessories(&self) -> Result<Vec<Accessory>, ServiceError> {
        Ok(self.accessories.clone())
    }
}
