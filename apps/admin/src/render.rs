//! Plain-text table renderer for a terminal.

use std::io::Write;

use client_core::{
    catalog::PLACEHOLDER_IMAGE_URL, Notice, NoticeLevel, PaginationDescriptor, ViewRenderer,
};
use shared::protocol::{Category, Product};
use tracing::{error, info, warn};

const ID_WIDTH: usize = 6;
const TITLE_WIDTH: usize = 34;
const PRICE_WIDTH: usize = 10;
const CATEGORY_WIDTH: usize = 16;

pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render_detail(&mut self, product: &Product) {
        let mut text = format!(
            "{}\n  ID:          {}\n  Title:       {}\n  Price:       {}\n  Category:    {}\n  Description: {}\n  Images:\n",
            product.title,
            product.id,
            product.title,
            product.price,
            product.category_name().unwrap_or("N/A"),
            product.description,
        );
        match product.images.as_deref() {
            Some(images) if !images.is_empty() => {
                for image in images {
                    text.push_str(&format!("    - {image}\n"));
                }
            }
            _ => text.push_str("    (none)\n"),
        }
        self.write(&text);
    }

    pub fn render_categories(&mut self, categories: &[Category]) {
        let mut text = format!("{:>ID_WIDTH$}  Name\n", "ID");
        for category in categories {
            text.push_str(&format!("{:>ID_WIDTH$}  {}\n", category.id, category.name));
        }
        self.write(&text);
    }

    pub fn write_line(&mut self, line: &str) {
        self.write(&format!("{line}\n"));
    }

    fn write(&mut self, text: &str) {
        if let Err(error) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(%error, "failed to write to terminal");
        }
    }
}

impl<W: Write> ViewRenderer for TerminalRenderer<W> {
    fn render(&mut self, rows: &[&Product], pagination: &PaginationDescriptor) {
        let mut text = format_row("ID", "Title", "Price", "Category", "Image");
        text.push_str(&"-".repeat(ID_WIDTH + TITLE_WIDTH + PRICE_WIDTH + CATEGORY_WIDTH + 20));
        text.push('\n');
        if rows.is_empty() {
            text.push_str("(no products)\n");
        }
        for product in rows {
            text.push_str(&format_row(
                &product.id.to_string(),
                &product.title,
                &product.price.to_string(),
                product.category_name().unwrap_or("N/A"),
                product.first_image().unwrap_or(PLACEHOLDER_IMAGE_URL),
            ));
        }
        if let Some(strip) = pagination_strip(pagination) {
            text.push_str(&strip);
            text.push('\n');
        }
        self.write(&text);
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(message = %notice.message, "notice"),
            NoticeLevel::Warning => warn!(message = %notice.message, "notice"),
            NoticeLevel::Error => error!(message = %notice.message, "notice"),
        }
        let label = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        self.write(&format!("[{label}] {}\n", notice.message));
    }
}

fn format_row(id: &str, title: &str, price: &str, category: &str, image: &str) -> String {
    format!(
        "{:>ID_WIDTH$}  {:<TITLE_WIDTH$}  {:>PRICE_WIDTH$}  {:<CATEGORY_WIDTH$}  {}\n",
        id,
        truncate(title, TITLE_WIDTH),
        truncate(price, PRICE_WIDTH),
        truncate(category, CATEGORY_WIDTH),
        image,
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// `None` when there is a single page; controls are suppressed then.
pub fn pagination_strip(pagination: &PaginationDescriptor) -> Option<String> {
    if !pagination.is_visible() {
        return None;
    }
    let mut parts = Vec::with_capacity(pagination.total_pages + 2);
    parts.push(if pagination.has_prev { "« Prev" } else { "(Prev)" }.to_string());
    for page in pagination.page_numbers() {
        if page == pagination.current_page {
            parts.push(format!("[{page}]"));
        } else {
            parts.push(page.to_string());
        }
    }
    parts.push(if pagination.has_next { "Next »" } else { "(Next)" }.to_string());
    Some(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{Price, ProductId};

    fn descriptor(current_page: usize, total_pages: usize) -> PaginationDescriptor {
        PaginationDescriptor {
            current_page,
            total_pages,
            has_prev: current_page > 1,
            has_next: current_page < total_pages,
        }
    }

    #[test]
    fn strip_marks_current_page_and_disabled_ends() {
        assert_eq!(
            pagination_strip(&descriptor(1, 3)).as_deref(),
            Some("(Prev) [1] 2 3 Next »")
        );
        assert_eq!(
            pagination_strip(&descriptor(3, 3)).as_deref(),
            Some("« Prev 1 2 [3] (Next)")
        );
        assert_eq!(pagination_strip(&descriptor(1, 1)), None);
    }

    #[test]
    fn rows_fall_back_for_missing_category_and_image() {
        let product = Product {
            id: ProductId(4),
            title: "A very long product title that will not fit the column".into(),
            price: Price::Number(12.5),
            description: String::new(),
            category: None,
            images: None,
        };
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(&[&product], &descriptor(1, 1));

        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        let row = text.lines().nth(2).expect("row");
        assert!(row.contains("N/A"));
        assert!(row.contains(PLACEHOLDER_IMAGE_URL));
        assert!(row.contains('…'));
        assert!(row.contains("12.5"));
        assert!(!text.contains("Prev"));
    }

    #[test]
    fn empty_page_says_so() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(&[], &descriptor(1, 1));
        let text = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(text.contains("(no products)"));
    }
}
