use shared::protocol::Product;

pub const CSV_HEADER: &str = "ID,Title,Price,Category,Description";

/// Renders records as CSV: header line, then one row per record with text
/// columns quoted. Rows are joined by `\n` with no trailing newline.
pub fn export_csv<'a>(records: impl IntoIterator<Item = &'a Product>) -> String {
    let mut out = String::from(CSV_HEADER);
    for product in records {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{},{}",
            product.id,
            quote(&product.title),
            product.price,
            quote(product.category_name().unwrap_or_default()),
            quote(&product.description),
        ));
    }
    out
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
