//! Client-side core of the catalog admin: the list view engine, its
//! controller, and the collaborators around it (catalog HTTP client, product
//! form validation, CSV export).

pub mod catalog;
pub mod error;
pub mod export;
pub mod form;
pub mod list_view;
pub mod view;

pub use catalog::{
    load_categories_or_fallback, load_products_or_fallback, CatalogBackend, CatalogClient,
    Fetched,
};
pub use error::CatalogError;
pub use export::export_csv;
pub use form::{ProductField, ProductForm};
pub use list_view::{
    ListViewEngine, PaginationDescriptor, SortDirection, SortKey, SortState, ViewOptions,
};
pub use view::{CatalogView, Notice, NoticeLevel, ViewCommand, ViewRenderer};
