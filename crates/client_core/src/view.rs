//! Command intake for a list view and the renderer it redraws.

use shared::{error::ValidationError, protocol::Product};
use tracing::debug;

use crate::list_view::{ListViewEngine, PaginationDescriptor, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message; failures outside the engine are surfaced this way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait ViewRenderer {
    /// Called after every applied command with the page to draw.
    fn render(&mut self, rows: &[&Product], pagination: &PaginationDescriptor);

    fn notify(&mut self, notice: Notice);
}

#[derive(Debug, Clone)]
pub enum ViewCommand {
    Load(Vec<Product>),
    Search(String),
    Sort(SortKey),
    PageSize(i64),
    Page(i64),
    NextPage,
    PrevPage,
}

impl ViewCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ViewCommand::Load(_) => "load",
            ViewCommand::Search(_) => "search",
            ViewCommand::Sort(_) => "sort",
            ViewCommand::PageSize(_) => "page_size",
            ViewCommand::Page(_) => "page",
            ViewCommand::NextPage => "next_page",
            ViewCommand::PrevPage => "prev_page",
        }
    }
}

/// Owns one engine and one renderer. Commands run to completion in arrival
/// order and each applied command ends with a redraw.
pub struct CatalogView<R: ViewRenderer> {
    engine: ListViewEngine,
    renderer: R,
}

impl<R: ViewRenderer> CatalogView<R> {
    pub fn new(engine: ListViewEngine, renderer: R) -> Self {
        Self { engine, renderer }
    }

    pub fn dispatch(&mut self, command: ViewCommand) -> Result<(), ValidationError> {
        let name = command.name();
        match command {
            ViewCommand::Load(records) => self.engine.load(records),
            ViewCommand::Search(query) => self.engine.set_search_query(&query),
            ViewCommand::Sort(key) => self.engine.set_sort_key(key),
            ViewCommand::PageSize(size) => self.engine.set_page_size(size)?,
            ViewCommand::Page(page) => {
                self.engine.set_page(page);
            }
            ViewCommand::NextPage => {
                self.engine.next_page();
            }
            ViewCommand::PrevPage => {
                self.engine.prev_page();
            }
        }
        debug!(
            command = name,
            page = self.engine.current_page(),
            total_pages = self.engine.total_pages(),
            "applied view command"
        );
        self.redraw();
        Ok(())
    }

    pub fn redraw(&mut self) {
        let rows = self.engine.current_page_records();
        let pagination = self.engine.pagination_descriptor();
        self.renderer.render(&rows, &pagination);
    }

    pub fn notify(&mut self, notice: Notice) {
        self.renderer.notify(notice);
    }

    pub fn engine(&self) -> &ListViewEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (ListViewEngine, R) {
        (self.engine, self.renderer)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
