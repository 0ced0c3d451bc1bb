use std::{io, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_categories_or_fallback, CatalogBackend, CatalogClient, CatalogView, ListViewEngine,
    Notice, ProductField, SortKey, ViewRenderer,
};
use shared::{domain::ProductId, error::ValidationError};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod session;

use config::{load_settings, normalize_base_url, Settings};
use render::TerminalRenderer;
use session::{create_payload, edit_payload, fetch_products, write_export, Session};

#[derive(Parser, Debug)]
#[command(name = "catalog-admin", about = "Browse, export and edit products of a remote catalog")]
struct Cli {
    /// Catalog API base URL, e.g. https://api.escuelajs.co/api/v1
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file (defaults to ./catalog_admin.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the product list
    List(ViewArgs),
    /// Print every field of one product
    Show { id: i64 },
    /// Write the filtered and sorted list as CSV
    Export {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List product categories
    Categories,
    /// Create a product
    Create(ProductFields),
    /// Update a product; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Interactive session reading commands from stdin
    Interactive,
}

#[derive(Args, Debug, Default)]
struct ViewArgs {
    #[arg(long)]
    search: Option<String>,
    /// Sort key (id, title, price, category); repeat a key to reverse it
    #[arg(long = "sort")]
    sort: Vec<SortKey>,
    #[arg(long, allow_negative_numbers = true)]
    page_size: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    page: Option<i64>,
}

impl ViewArgs {
    fn apply(&self, engine: &mut ListViewEngine) -> Result<(), ValidationError> {
        if let Some(size) = self.page_size {
            engine.set_page_size(size)?;
        }
        if let Some(query) = &self.search {
            engine.set_search_query(query);
        }
        for key in &self.sort {
            engine.set_sort_key(*key);
        }
        if let Some(page) = self.page {
            engine.set_page(page);
        }
        Ok(())
    }
}

#[derive(Args, Debug, Default)]
struct ProductFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category_id: Option<String>,
    /// Comma separated image URLs
    #[arg(long)]
    images: Option<String>,
}

impl ProductFields {
    /// The flags that were given, as form field assignments.
    fn into_edits(self) -> Vec<(ProductField, String)> {
        [
            (ProductField::Title, self.title),
            (ProductField::Price, self.price),
            (ProductField::Description, self.description),
            (ProductField::Category, self.category_id),
            (ProductField::Images, self.images),
        ]
        .into_iter()
        .filter_map(|(field, value)| Some((field, value?)))
        .collect()
    }
}

type StdoutRenderer = TerminalRenderer<io::Stdout>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = normalize_base_url(api_url);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let client = CatalogClient::with_timeout(
        &settings.api_base_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    info!(api = client.base_url(), "catalog admin starting");
    let mut renderer = TerminalRenderer::new(io::stdout());

    match cli.command {
        Command::List(args) => {
            let engine = load_engine(&client, &settings, &mut renderer, &args).await?;
            CatalogView::new(engine, renderer).redraw();
        }
        Command::Show { id } => {
            let products = client
                .list_products()
                .await
                .context("could not load products")?;
            let product = products
                .iter()
                .find(|product| product.id == ProductId(id))
                .ok_or_else(|| anyhow!("Product not found: {id}"))?;
            renderer.render_detail(product);
        }
        Command::Export { view, output } => {
            let engine = load_engine(&client, &settings, &mut renderer, &view).await?;
            let path = output.unwrap_or_else(|| settings.export_path.clone());
            let count = write_export(&path, engine.visible_records()).await?;
            renderer.notify(Notice::info(format!(
                "Exported {count} products to {}",
                path.display()
            )));
        }
        Command::Categories => {
            let fetched = load_categories_or_fallback(&client).await;
            if let Some(reason) = &fetched.fallback_reason {
                renderer.notify(Notice::warning(format!(
                    "Could not load categories ({reason})"
                )));
            }
            renderer.render_categories(&fetched.items);
        }
        Command::Create(fields) => {
            let payload = create_payload(&fields.into_edits())?;
            let created = client
                .create_product(&payload)
                .await
                .context("create failed")?;
            renderer.notify(Notice::info(format!(
                "Created successfully (id {})",
                created.id
            )));
            let engine =
                load_engine(&client, &settings, &mut renderer, &ViewArgs::default()).await?;
            CatalogView::new(engine, renderer).redraw();
        }
        Command::Update { id, fields } => {
            let id = ProductId(id);
            let payload = edit_payload(&client, id, &fields.into_edits()).await?;
            client
                .update_product(id, &payload)
                .await
                .context("update failed")?;
            renderer.notify(Notice::info("Updated successfully"));
            let engine =
                load_engine(&client, &settings, &mut renderer, &ViewArgs::default()).await?;
            CatalogView::new(engine, renderer).redraw();
        }
        Command::Interactive => {
            let view = CatalogView::new(ListViewEngine::new(settings.view_options()), renderer);
            let mut session = Session::start(&client, view, settings.export_path.clone()).await?;
            session.run(BufReader::new(tokio::io::stdin())).await?;
        }
    }

    Ok(())
}

/// Fetches the catalog into a fresh engine and applies the view arguments.
async fn load_engine<B: CatalogBackend + ?Sized>(
    backend: &B,
    settings: &Settings,
    renderer: &mut StdoutRenderer,
    args: &ViewArgs,
) -> Result<ListViewEngine> {
    let mut engine = ListViewEngine::new(settings.view_options());
    engine.load(fetch_products(backend, renderer).await);
    args.apply(&mut engine)?;
    Ok(engine)
}
