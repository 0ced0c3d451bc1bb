//! In-memory list view over the product catalog: search filter, sort and
//! pagination kept mutually consistent across commands.

use std::{cmp::Ordering, fmt, ops::RangeInclusive, str::FromStr};

use shared::{
    domain::ProductId,
    error::ValidationError,
    protocol::Product,
};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    Title,
    Price,
    Category,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Id, SortKey::Title, SortKey::Price, SortKey::Category];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Title => "title",
            SortKey::Price => "price",
            SortKey::Category => "category",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Price => compare_prices(a.price.value(), b.price.value()),
            SortKey::Category => a
                .category_name()
                .unwrap_or_default()
                .cmp(b.category_name().unwrap_or_default()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key '{0}' (expected id, title, price or category)")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// Unparseable prices order after every number.
fn compare_prices(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub page_size: usize,
    /// Re-apply the active sort after `load` and `set_search_query`. When
    /// off, both rebuild the view in load order and leave the sort key set.
    pub resort_on_refresh: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            resort_on_refresh: true,
        }
    }
}

/// What a renderer needs to draw prev / page-number / next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationDescriptor {
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationDescriptor {
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages
    }

    /// Controls are suppressed entirely for a single page.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }
}

#[derive(Debug, Clone)]
pub struct ListViewEngine {
    source: Vec<Product>,
    /// Indices into `source`, in display order.
    visible: Vec<usize>,
    search_query: String,
    sort: Option<SortState>,
    page_size: usize,
    current_page: usize,
    resort_on_refresh: bool,
}

impl Default for ListViewEngine {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl ListViewEngine {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            source: Vec::new(),
            visible: Vec::new(),
            search_query: String::new(),
            sort: None,
            page_size: options.page_size.max(1),
            current_page: 1,
            resort_on_refresh: options.resort_on_refresh,
        }
    }

    /// Replaces the record set wholesale and returns to page 1.
    pub fn load(&mut self, records: Vec<Product>) {
        debug!(count = records.len(), "list view: load");
        self.source = records;
        self.refresh_visible();
        self.current_page = 1;
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_lowercase();
        self.refresh_visible();
        self.current_page = 1;
        debug!(
            query = %self.search_query,
            visible = self.visible.len(),
            "list view: search"
        );
    }

    /// Repeating the active key flips direction; a new key starts ascending.
    /// The current page number is kept.
    pub fn set_sort_key(&mut self, key: SortKey) {
        let direction = match self.sort {
            Some(active) if active.key == key => active.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState { key, direction });
        self.apply_sort();
        self.clamp_page();
    }

    pub fn set_page_size(&mut self, size: i64) -> Result<(), ValidationError> {
        let size = usize::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ValidationError::NonPositivePageSize(size))?;
        self.page_size = size;
        self.current_page = 1;
        Ok(())
    }

    /// Out-of-range pages are ignored. Returns whether the request was applied.
    pub fn set_page(&mut self, page: i64) -> bool {
        match usize::try_from(page) {
            Ok(page) if (1..=self.total_pages()).contains(&page) => {
                self.current_page = page;
                true
            }
            _ => {
                debug!(page, total_pages = self.total_pages(), "list view: page out of range");
                false
            }
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page as i64 + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.current_page as i64 - 1)
    }

    pub fn current_page_records(&self) -> Vec<&Product> {
        let start = (self.current_page - 1) * self.page_size;
        self.visible
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&index| &self.source[index])
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(self.page_size).max(1)
    }

    pub fn pagination_descriptor(&self) -> PaginationDescriptor {
        let total_pages = self.total_pages();
        PaginationDescriptor {
            current_page: self.current_page,
            total_pages,
            has_prev: self.current_page > 1,
            has_next: self.current_page < total_pages,
        }
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.source.iter().find(|product| product.id == id)
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &Product> + '_ {
        self.visible.iter().map(|&index| &self.source[index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn source_records(&self) -> &[Product] {
        &self.source
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn refresh_visible(&mut self) {
        let query = &self.search_query;
        self.visible = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, product)| query.is_empty() || product.title.to_lowercase().contains(query))
            .map(|(index, _)| index)
            .collect();
        if self.resort_on_refresh {
            self.apply_sort();
        }
    }

    fn apply_sort(&mut self) {
        let Some(sort) = self.sort else {
            return;
        };
        let source = &self.source;
        // `sort_by` is stable: equal keys keep their previous relative order.
        self.visible
            .sort_by(|&a, &b| sort.compare(&source[a], &source[b]));
    }

    fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }
}

#[cfg(test)]
#[path = "tests/list_view_tests.rs"]
mod tests;
