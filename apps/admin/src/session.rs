//! Line-oriented interactive session: one command per line, each applied to
//! the view before the next line is read.

use std::{io::Write, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use client_core::{
    export_csv, load_categories_or_fallback, load_products_or_fallback, CatalogBackend,
    CatalogView, Fetched, Notice, ProductField, ProductForm, ViewCommand, ViewRenderer,
};
use shared::{
    domain::ProductId,
    protocol::{Category, Product, ProductPayload},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::render::TerminalRenderer;

pub const HELP: &str = "\
commands:
  search <text>     filter by title (empty clears)
  sort <key>        sort by id, title, price or category (repeat to reverse)
  size <n>          products per page
  page <n>          jump to page
  next | prev       move one page
  show <id>         product details
  categories        list categories
  export [path]     write the current view as CSV
  create <field=value>...
                    create a product (title, price, description, category, images)
  edit <id> <field=value>...
                    change fields of a product; the rest keep their value
  reload            fetch products and categories again
  help | quit";

#[derive(Debug, Clone)]
pub enum SessionCommand {
    View(ViewCommand),
    Show(ProductId),
    Categories,
    Export(Option<PathBuf>),
    Create(Vec<(ProductField, String)>),
    Edit(ProductId, Vec<(ProductField, String)>),
    Reload,
    Help,
    Quit,
}

/// Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<SessionCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "search" | "find" => SessionCommand::View(ViewCommand::Search(rest.to_string())),
        "sort" => SessionCommand::View(ViewCommand::Sort(rest.parse()?)),
        "size" => SessionCommand::View(ViewCommand::PageSize(parse_number(rest, "size")?)),
        "page" => SessionCommand::View(ViewCommand::Page(parse_number(rest, "page")?)),
        "next" | "n" => SessionCommand::View(ViewCommand::NextPage),
        "prev" | "p" => SessionCommand::View(ViewCommand::PrevPage),
        "show" => SessionCommand::Show(ProductId(parse_number(rest, "show")?)),
        "categories" => SessionCommand::Categories,
        "export" => SessionCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "create" | "new" => SessionCommand::Create(parse_assignments(rest)?),
        "edit" => {
            let (id, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            SessionCommand::Edit(
                ProductId(parse_number(id, "edit")?),
                parse_assignments(fields)?,
            )
        }
        "reload" => SessionCommand::Reload,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => bail!("unknown command '{other}'; type 'help'"),
    };
    Ok(Some(command))
}

fn parse_number(text: &str, command: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| anyhow!("'{command}' expects a whole number, got '{text}'"))
}

/// Splits `title=Red shirt price=12` into field assignments. A value runs up
/// to the next token that starts with a known field name and `=`.
pub fn parse_assignments(text: &str) -> Result<Vec<(ProductField, String)>> {
    let mut assignments: Vec<(ProductField, String)> = Vec::new();
    for token in text.split_whitespace() {
        let assignment = token
            .split_once('=')
            .and_then(|(key, value)| Some((key.parse::<ProductField>().ok()?, value)));
        match (assignment, assignments.last_mut()) {
            (Some((field, value)), _) => assignments.push((field, value.to_string())),
            (None, Some((_, value))) => {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(token);
            }
            (None, None) => bail!(
                "expected field=value (title, price, description, category, images), got '{token}'"
            ),
        }
    }
    if assignments.is_empty() {
        bail!("expected at least one field=value");
    }
    Ok(assignments)
}

fn warn_products_fallback<R: ViewRenderer>(renderer: &mut R, fetched: &Fetched<Product>) {
    if let Some(reason) = &fetched.fallback_reason {
        renderer.notify(Notice::warning(format!(
            "Could not load products ({reason}); showing sample data"
        )));
    }
}

/// Fetches products, telling the user when sample data stands in.
pub async fn fetch_products<B, R>(backend: &B, renderer: &mut R) -> Vec<Product>
where
    B: CatalogBackend + ?Sized,
    R: ViewRenderer,
{
    let fetched = load_products_or_fallback(backend).await;
    warn_products_fallback(renderer, &fetched);
    fetched.items
}

/// Products and categories fetched concurrently, each with its own fallback.
async fn fetch_catalog<B, R>(backend: &B, renderer: &mut R) -> (Vec<Product>, Vec<Category>)
where
    B: CatalogBackend + ?Sized,
    R: ViewRenderer,
{
    let (products, categories) = futures::join!(
        load_products_or_fallback(backend),
        load_categories_or_fallback(backend)
    );
    warn_products_fallback(renderer, &products);
    if let Some(reason) = &categories.fallback_reason {
        renderer.notify(Notice::warning(format!(
            "Could not load categories ({reason})"
        )));
    }
    (products.items, categories.items)
}

/// Builds the update for `id` from the record the catalog serves right now,
/// with `edits` laid over it. Sample data never stands in here: if the
/// catalog can't be read the edit is refused.
pub async fn edit_payload<B: CatalogBackend + ?Sized>(
    backend: &B,
    id: ProductId,
    edits: &[(ProductField, String)],
) -> Result<ProductPayload> {
    let products = backend
        .list_products()
        .await
        .context("could not load the product to edit")?;
    let current = products
        .iter()
        .find(|product| product.id == id)
        .ok_or_else(|| anyhow!("Product not found: {id}"))?;
    let mut form = ProductForm::from_product(current);
    for (field, value) in edits {
        form.set(*field, value.as_str());
    }
    Ok(form.validate()?)
}

pub fn create_payload(edits: &[(ProductField, String)]) -> Result<ProductPayload> {
    let mut form = ProductForm::default();
    for (field, value) in edits {
        form.set(*field, value.as_str());
    }
    Ok(form.validate()?)
}

pub async fn write_export<'a>(
    path: &std::path::Path,
    records: impl IntoIterator<Item = &'a Product>,
) -> Result<usize> {
    let records: Vec<&Product> = records.into_iter().collect();
    let count = records.len();
    tokio::fs::write(path, export_csv(records))
        .await
        .with_context(|| format!("failed to write CSV export to '{}'", path.display()))?;
    Ok(count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<'a, B: CatalogBackend + ?Sized, W: Write> {
    backend: &'a B,
    view: CatalogView<TerminalRenderer<W>>,
    categories: Vec<Category>,
    export_path: PathBuf,
}

impl<'a, B: CatalogBackend + ?Sized, W: Write> Session<'a, B, W> {
    /// Loads products and categories concurrently and draws the first page.
    pub async fn start(
        backend: &'a B,
        view: CatalogView<TerminalRenderer<W>>,
        export_path: PathBuf,
    ) -> Result<Self> {
        let mut session = Self {
            backend,
            view,
            categories: Vec::new(),
            export_path,
        };
        session.reload().await?;
        Ok(session)
    }

    /// Search text, sort and page size survive; the page goes back to 1.
    async fn reload(&mut self) -> Result<()> {
        let (products, categories) = fetch_catalog(self.backend, self.view.renderer_mut()).await;
        self.categories = categories;
        self.view.dispatch(ViewCommand::Load(products))?;
        Ok(())
    }

    #[cfg(test)]
    pub fn view(&self) -> &CatalogView<TerminalRenderer<W>> {
        &self.view
    }

    #[cfg(test)]
    pub fn into_view(self) -> CatalogView<TerminalRenderer<W>> {
        self.view
    }

    /// Command failures are reported to the user and the session goes on.
    pub async fn execute(&mut self, command: SessionCommand) -> Flow {
        match self.try_execute(command).await {
            Ok(flow) => flow,
            Err(error) => {
                self.view.notify(Notice::error(format!("{error:#}")));
                Flow::Continue
            }
        }
    }

    async fn try_execute(&mut self, command: SessionCommand) -> Result<Flow> {
        match command {
            SessionCommand::View(command) => self.view.dispatch(command)?,
            SessionCommand::Show(id) => {
                let product = self
                    .view
                    .engine()
                    .find(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("Product not found: {id}"))?;
                self.view.renderer_mut().render_detail(&product);
            }
            SessionCommand::Categories => {
                self.view.renderer_mut().render_categories(&self.categories)
            }
            SessionCommand::Export(path) => {
                let path = path.unwrap_or_else(|| self.export_path.clone());
                let count = write_export(&path, self.view.engine().visible_records()).await?;
                self.view.notify(Notice::info(format!(
                    "Exported {count} products to {}",
                    path.display()
                )));
            }
            SessionCommand::Create(fields) => {
                let payload = create_payload(&fields)?;
                let created = self
                    .backend
                    .create_product(&payload)
                    .await
                    .context("create failed")?;
                self.view.notify(Notice::info(format!(
                    "Created successfully (id {})",
                    created.id
                )));
                self.reload().await?;
            }
            SessionCommand::Edit(id, fields) => {
                let payload = edit_payload(self.backend, id, &fields).await?;
                self.backend
                    .update_product(id, &payload)
                    .await
                    .context("update failed")?;
                self.view.notify(Notice::info("Updated successfully"));
                self.reload().await?;
            }
            SessionCommand::Reload => self.reload().await?,
            SessionCommand::Help => self.view.renderer_mut().write_line(HELP),
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("failed to read input")? {
            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(error) => {
                    self.view.notify(Notice::error(error.to_string()));
                    continue;
                }
            };
            debug!(?command, "session command");
            if self.execute(command).await == Flow::Quit {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
