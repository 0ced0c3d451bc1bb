//! Create / edit form input and its presence checks.

use std::{fmt, str::FromStr};

use shared::{
    domain::{parse_leading_float, CategoryId},
    error::ValidationError,
    protocol::{Product, ProductPayload},
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Title,
    Price,
    Description,
    Category,
    Images,
}

impl ProductField {
    pub const ALL: [ProductField; 5] = [
        ProductField::Title,
        ProductField::Price,
        ProductField::Description,
        ProductField::Category,
        ProductField::Images,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Title => "title",
            ProductField::Price => "price",
            ProductField::Description => "description",
            ProductField::Category => "category",
            ProductField::Images => "images",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product field '{0}' (expected title, price, description, category or images)")]
pub struct UnknownProductField(pub String);

impl FromStr for ProductField {
    type Err = UnknownProductField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("category_id") {
            return Ok(ProductField::Category);
        }
        ProductField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownProductField(s.to_string()))
    }
}

/// Raw field text as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    pub category_id: String,
    /// Comma separated image URLs.
    pub images: String,
}

impl ProductForm {
    /// Pre-fills an edit form from an existing record. Absent values become
    /// empty text.
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            category_id: product
                .category
                .as_ref()
                .map(|category| category.id.to_string())
                .unwrap_or_default(),
            images: product
                .images
                .as_ref()
                .map(|images| images.join(", "))
                .unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Title => self.title = value,
            ProductField::Price => self.price = value,
            ProductField::Description => self.description = value,
            ProductField::Category => self.category_id = value,
            ProductField::Images => self.images = value,
        }
    }

    pub fn validate(&self) -> Result<ProductPayload, ValidationError> {
        let title = self.title.trim();
        let price = parse_leading_float(&self.price);
        let description = self.description.trim();
        let category_id = self.category_id.trim().parse::<i64>().ok();
        let images = self.images.trim();

        let mut missing = Vec::new();
        if title.is_empty() {
            missing.push("title");
        }
        if price.is_none() {
            missing.push("price");
        }
        if description.is_empty() {
            missing.push("description");
        }
        if category_id.is_none() {
            missing.push("category");
        }
        if images.is_empty() {
            missing.push("images");
        }

        let (Some(price), Some(category_id)) = (price, category_id) else {
            return Err(ValidationError::MissingFields { fields: missing });
        };
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        let images: Vec<String> = images
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        if images.is_empty() {
            return Err(ValidationError::NoImages);
        }

        Ok(ProductPayload {
            title: title.to_string(),
            price,
            description: description.to_string(),
            category_id: CategoryId(category_id),
            images,
        })
    }
}
