use super::*;
use shared::domain::{Price, ProductId};

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Vec<i64>, PaginationDescriptor)>,
    notices: Vec<Notice>,
}

impl ViewRenderer for RecordingRenderer {
    fn render(&mut self, rows: &[&Product], pagination: &PaginationDescriptor) {
        self.frames
            .push((rows.iter().map(|row| row.id.0).collect(), *pagination));
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

fn products(count: i64) -> Vec<Product> {
    (1..=count)
        .map(|id| Product {
            id: ProductId(id),
            title: format!("Product {id}"),
            price: Price::Number(id as f64),
            description: String::new(),
            category: None,
            images: None,
        })
        .collect()
}

fn view() -> CatalogView<RecordingRenderer> {
    CatalogView::new(ListViewEngine::default(), RecordingRenderer::default())
}

#[test]
fn every_applied_command_redraws_in_order() {
    let mut view = view();
    view.dispatch(ViewCommand::Load(products(25))).expect("load");
    view.dispatch(ViewCommand::NextPage).expect("next");
    view.dispatch(ViewCommand::Sort(SortKey::Price)).expect("sort");
    view.dispatch(ViewCommand::Sort(SortKey::Price)).expect("sort");
    view.dispatch(ViewCommand::Search("product 1".into()))
        .expect("search");

    let frames = &view.renderer().frames;
    assert_eq!(frames.len(), 5);
    assert_eq!(frames[0].0, (1..=10).collect::<Vec<_>>());
    assert_eq!(frames[1].1.current_page, 2);
    assert_eq!(frames[3].0, (6..=15).rev().collect::<Vec<_>>());
    assert_eq!(frames[4].1.current_page, 1);
    assert_eq!(frames[4].1.total_pages, 2);
}

#[test]
fn rejected_page_size_returns_error_without_redraw() {
    let mut view = view();
    view.dispatch(ViewCommand::Load(products(3))).expect("load");

    let err = view
        .dispatch(ViewCommand::PageSize(0))
        .expect_err("should reject");
    assert_eq!(err, ValidationError::NonPositivePageSize(0));
    assert_eq!(view.renderer().frames.len(), 1);
    assert_eq!(view.engine().page_size(), 10);
}

#[test]
fn ignored_page_request_still_redraws_the_same_page() {
    let mut view = view();
    view.dispatch(ViewCommand::Load(products(25))).expect("load");
    view.dispatch(ViewCommand::Page(99)).expect("page");

    let frames = &view.renderer().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], frames[1]);
}

#[test]
fn notices_are_forwarded_to_the_renderer() {
    let mut view = view();
    view.notify(Notice::error("Network error: connection refused"));
    assert_eq!(
        view.renderer().notices,
        vec![Notice::error("Network error: connection refused")]
    );
    assert_eq!(view.renderer().notices[0].level, NoticeLevel::Error);
}
