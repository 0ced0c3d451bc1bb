use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{CategoryId, Price, ProductId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A catalog product as served by `GET /products`. Fields the catalog adds
/// beyond these are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Product {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|category| category.name.as_str())
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images
            .as_deref()
            .and_then(|images| images.first())
            .map(String::as_str)
    }
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub title: String,
    pub price: f64,
    pub description: String,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_tolerates_missing_category_and_images() {
        let product: Product =
            serde_json::from_str(r#"{"id":7,"title":"Lamp","price":"19.5","description":"d"}"#)
                .expect("product");
        assert_eq!(product.id, ProductId(7));
        assert_eq!(product.price.value(), Some(19.5));
        assert!(product.category_name().is_none());
        assert!(product.first_image().is_none());
    }

    #[test]
    fn null_title_description_and_price_read_as_empty() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[{"id":1,"title":null,"price":null,"description":null,"category":null,"images":null},
                {"id":2,"title":"Mug","price":4,"description":"d"}]"#,
        )
        .expect("products");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "");
        assert_eq!(products[0].description, "");
        assert_eq!(products[0].price, Price::default());
        assert_eq!(products[0].price.value(), None);
        assert!(products[0].category.is_none());
        assert_eq!(products[1].price.value(), Some(4.0));
    }

    #[test]
    fn product_ignores_extra_catalog_fields() {
        let product: Product = serde_json::from_str(
            r#"{"id":1,"title":"Shirt","slug":"shirt","price":10,"description":"",
                "category":{"id":2,"name":"Clothes","slug":"clothes"},
                "images":["https://i.example/1.png"],"creationAt":"2024-01-01T00:00:00.000Z"}"#,
        )
        .expect("product");
        assert_eq!(product.category_name(), Some("Clothes"));
        assert_eq!(product.first_image(), Some("https://i.example/1.png"));
    }

    #[test]
    fn payload_uses_camel_case_category_id() {
        let payload = ProductPayload {
            title: "Chair".into(),
            price: 25.0,
            description: "Oak".into(),
            category_id: CategoryId(3),
            images: vec!["https://i.example/c.png".into()],
        };
        let json = serde_json::to_value(&payload).expect("json");
        assert_eq!(json["categoryId"], 3);
        assert!(json.get("category_id").is_none());
    }
}
