use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tradein_core::config::CatalogConfig;
use tradein_core::{ProductId, Variant, VariantId};

use crate::error::ServiceError;

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Variants a product can be sold as, each carrying its base price.
    async fn variants_for(&self, product_id: &ProductId) -> Result<Vec<Variant>, ServiceError>;
}

pub struct HttpCatalogService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogService {
    pub fn new(config: &CatalogConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, base_url: config.base_url.trim_end_matches('/').to_owned() }
    }
}

/// Wire shape of the catalog payload; the collaborator speaks camelCase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantDto {
    id: String,
    label: String,
    base_price: Decimal,
}

impl From<VariantDto> for Variant {
    fn from(dto: VariantDto) -> Self {
        Self { id: VariantId(dto.id), label: dto.label, base_price: dto.base_price }
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn variants_for(&self, product_id: &ProductId) -> Result<Vec<Variant>, ServiceError> {
        let endpoint = format!("{}/products/{}/variants", self.base_url, product_id.0);

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

        let variants: Vec<VariantDto> = response
            .json()
            .await
            .map_err(|source| ServiceError::Decode { endpoint: endpoint.clone(), source })?;

        Ok(variants.into_iter().map(Variant::from).collect())
    }
}

/// Fixture-backed catalog for tests and local development.
#[derive(Default)]
pub struct InMemoryCatalogService {
    variants: HashMap<String, Vec<Variant>>,
}

impl InMemoryCatalogService {
    pub fn with_product(mut self, product_id: &str, variants: Vec<Variant>) -> Self {
        self.variants.insert(product_id.to_owned(), variants);
        self
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn variants_for(&self, product_id: &ProductId) -> Result<Vec<Variant>, ServiceError> {
        Ok(self.variants.get(&product_id.0).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tradein_core::{ProductId, Variant, VariantId};

    use super::{CatalogService, InMemoryCatalogService, VariantDto};

    #[tokio::test]
    async fn in_memory_catalog_serves_seeded_variants() {
        let catalog = InMemoryCatalogService::default().with_product(
            "pixel-8",
            vec![Variant {
                id: VariantId("pixel-8-128".to_owned()),
                label: "8 GB / 128 GB".to_owned(),
                base_price: Decimal::from(38_000),
            }],
        );

        let variants =
            catalog.variants_for(&ProductId("pixel-8".to_owned())).await.expect("seeded product");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].base_price, Decimal::from(38_000));

        let missing =
            catalog.variants_for(&ProductId("unknown".to_owned())).await.expect("unknown product");
        assert!(missing.is_empty());
    }

    #[test]
    fn variant_wire_shape_is_camel_case() {
        let dto: VariantDto = serde_json::from_str(
            r#"{"id":"pixel-8-128","label":"8 GB / 128 GB","basePrice":38000}"#,
        )
        .expect("parse variant dto");

        let variant = Variant::from(dto);
        assert_eq!(variant.id, VariantId("pixel-8-128".to_owned()));
        assert_eq!(variant.base_price, Decimal::from(38_000));
    }
}
