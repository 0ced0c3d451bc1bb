//! HTTP access to the remote product catalog.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CategoryId, Price, ProductId},
    protocol::{Category, Product, ProductPayload},
};
use tracing::{info, warn};
use url::Url;

use crate::error::CatalogError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.escuelajs.co/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/50";

#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;
    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, CatalogError>;
    async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| CatalogError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let res = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .send()
            .await?;
        Ok(ensure_success(res).await?.json().await?)
    }
}

#[async_trait]
impl CatalogBackend for CatalogClient {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let raw: Vec<serde_json::Value> = self.get_json("products").await?;
        let total = raw.len();
        let products: Vec<Product> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Product>(value) {
                Ok(product) => Some(product),
                Err(error) => {
                    warn!(%error, "catalog: skipping malformed product record");
                    None
                }
            })
            .collect();
        info!(
            count = products.len(),
            skipped = total - products.len(),
            "catalog: fetched products"
        );
        Ok(products)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let categories: Vec<Category> = self.get_json("categories").await?;
        info!(count = categories.len(), "catalog: fetched categories");
        Ok(categories)
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, CatalogError> {
        let res = self
            .http
            .post(format!("{}/products", self.base_url))
            .json(payload)
            .send()
            .await?;
        let created: Product = ensure_success(res).await?.json().await?;
        info!(product_id = created.id.0, "catalog: created product");
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, CatalogError> {
        let res = self
            .http
            .put(format!("{}/products/{id}", self.base_url))
            .json(payload)
            .send()
            .await?;
        let updated: Product = ensure_success(res).await?.json().await?;
        info!(product_id = id.0, "catalog: updated product");
        Ok(updated)
    }
}

/// Turns a non-2xx response into [`CatalogError::Status`] carrying the body
/// text the catalog sent back.
async fn ensure_success(res: Response) -> Result<Response, CatalogError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(CatalogError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

/// Items fetched from the catalog, or stand-in data with the reason the
/// fetch was not usable.
#[derive(Debug)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub fallback_reason: Option<CatalogError>,
}

impl<T> Fetched<T> {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![Product {
        id: ProductId(1),
        title: "Sample".into(),
        price: Price::Number(100.0),
        description: "Sample desc".into(),
        category: Some(Category {
            id: CategoryId(1),
            name: "Sample".into(),
            image: None,
        }),
        images: Some(vec![PLACEHOLDER_IMAGE_URL.into()]),
    }]
}

pub fn sample_categories() -> Vec<Category> {
    vec![Category {
        id: CategoryId(1),
        name: "Sample Category".into(),
        image: None,
    }]
}

/// An empty product list counts as a failed fetch.
pub async fn load_products_or_fallback<B>(backend: &B) -> Fetched<Product>
where
    B: CatalogBackend + ?Sized,
{
    let reason = match backend.list_products().await {
        Ok(products) if !products.is_empty() => {
            return Fetched {
                items: products,
                fallback_reason: None,
            };
        }
        Ok(_) => CatalogError::EmptyCatalog,
        Err(error) => error,
    };
    warn!(error = %reason, "catalog: product fetch failed; showing sample data");
    Fetched {
        items: sample_products(),
        fallback_reason: Some(reason),
    }
}

pub async fn load_categories_or_fallback<B>(backend: &B) -> Fetched<Category>
where
    B: CatalogBackend + ?Sized,
{
    match backend.list_categories().await {
        Ok(categories) => Fetched {
            items: categories,
            fallback_reason: None,
        },
        Err(error) => {
            warn!(%error, "catalog: category fetch failed; using sample category");
            Fetched {
                items: sample_categories(),
                fallback_reason: Some(error),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
