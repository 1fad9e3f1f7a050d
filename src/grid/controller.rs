//! Grid controller: owns the view state and runs the pipeline
//! (filter -> sort -> paginate) whenever the state or the data changes.

use serde::Deserialize;
use tracing::debug;

use super::column::Column;
use super::dispatch::{render_row, resolve_columns};
use super::filter::filter_indices;
use super::paginate::{clamp_page, page_range, total_pages};
use super::record::{Record, Value};
use super::sort::{sorted_indices, SortDirection};

/// Per-grid configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub page_size: usize,
    pub searchable: bool,
    pub sortable: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            searchable: true,
            sortable: true,
        }
    }
}

/// Search, sort and paging state of one grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    /// 1-based
    pub current_page: usize,
    pub page_size: usize,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            current_page: 1,
            page_size: page_size.max(1),
            sort_key: None,
            sort_direction: SortDirection::Ascending,
        }
    }
}

/// What a presentation layer needs to draw the grid
#[derive(Debug)]
pub struct GridSnapshot<'a, H> {
    pub page_items: Vec<&'a Record<H>>,
    pub total_pages: usize,
    pub current_page: usize,
    pub search_term: &'a str,
    pub sort_key: Option<&'a str>,
    pub sort_direction: SortDirection,
}

pub struct GridController<H = ()> {
    config: GridConfig,
    columns: Option<Vec<Column<H>>>,
    records: Vec<Record<H>>,
    state: ViewState,
    /// Filtered and sorted indices into `records`
    visible: Vec<usize>,
}

impl<H: Clone> GridController<H> {
    pub fn new(config: GridConfig) -> Self {
        let state = ViewState::new(config.page_size);
        Self {
            config,
            columns: None,
            records: Vec::new(),
            state,
            visible: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column<H>>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Replace the explicit column list; `None` falls back to inference
    pub fn set_columns(&mut self, columns: Option<Vec<Column<H>>>) {
        self.columns = columns;
    }

    /// Swap in a fresh record collection. The current page is kept (clamped
    /// to the new page count) so background refreshes don't jump to page 1.
    pub fn set_data(&mut self, records: Vec<Record<H>>) {
        self.records = records;
        self.refresh();
    }

    /// Change the search term. A new term starts again from page 1.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.state.search_term {
            return;
        }
        self.state.search_term = term;
        self.state.current_page = 1;
        self.refresh();
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.current_page = clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.current_page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.state.current_page.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.total_pages());
    }

    /// Change the page size; 0 is treated as 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.clamp_current_page();
    }

    /// Sort by `key`. Asking for the current key again flips the direction;
    /// a new key starts ascending. Does nothing when sorting is disabled.
    pub fn request_sort(&mut self, key: &str) {
        if !self.config.sortable {
            return;
        }

        if self.state.sort_key.as_deref() == Some(key) {
            self.state.sort_direction = self.state.sort_direction.toggled();
        } else {
            self.state.sort_key = Some(key.to_string());
            self.state.sort_direction = SortDirection::Ascending;
        }
        debug!(key, direction = ?self.state.sort_direction, "sort requested");
        self.refresh();
    }

    /// Back to page 1 with an empty search
    pub fn reset_pagination(&mut self) {
        self.state.current_page = 1;
        self.state.search_term.clear();
        self.refresh();
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn records(&self) -> &[Record<H>] {
        &self.records
    }

    /// Number of records left after filtering
    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.visible.len(), self.state.page_size)
    }

    /// Filtered and sorted records, all pages
    pub fn visible_records(&self) -> Vec<&Record<H>> {
        self.visible.iter().map(|&i| &self.records[i]).collect()
    }

    /// Records on the current page
    pub fn page_items(&self) -> Vec<&Record<H>> {
        let range = page_range(self.visible.len(), self.state.current_page, self.state.page_size);
        self.visible[range].iter().map(|&i| &self.records[i]).collect()
    }

    pub fn snapshot(&self) -> GridSnapshot<'_, H> {
        GridSnapshot {
            page_items: self.page_items(),
            total_pages: self.total_pages(),
            current_page: self.state.current_page,
            search_term: &self.state.search_term,
            sort_key: self.state.sort_key.as_deref(),
            sort_direction: self.state.sort_direction,
        }
    }

    /// Explicit columns, or columns inferred from the first record
    pub fn columns(&self) -> Vec<Column<H>> {
        resolve_columns(self.columns.as_deref(), &self.records)
    }

    /// Displayed cells of the current page, row by row
    pub fn rendered_page(&self) -> Vec<Vec<Value<H>>> {
        let columns = self.columns();
        self.page_items()
            .into_iter()
            .map(|row| render_row(&columns, row))
            .collect()
    }

    fn refresh(&mut self) {
        let term = if self.config.searchable {
            self.state.search_term.as_str()
        } else {
            ""
        };
        let mut visible = filter_indices(&self.records, term);

        if let Some(key) = self.state.sort_key.as_deref() {
            visible = sorted_indices(&self.records, &visible, key, self.state.sort_direction);
        }

        self.visible = visible;
        self.clamp_current_page();

        debug!(
            records = self.records.len(),
            visible = self.visible.len(),
            page = self.state.current_page,
            "grid refreshed"
        );
    }

    fn clamp_current_page(&mut self) {
        self.state.current_page = clamp_page(self.state.current_page, self.total_pages());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: i64) -> Vec<Record> {
        (1..=n).map(|i| Record::new().with("id", i)).collect()
    }

    fn page_ids(grid: &GridController) -> Vec<i64> {
        grid.page_items().iter().filter_map(|r| r.id()).collect()
    }

    #[test]
    fn defaults() {
        let grid: GridController = GridController::new(GridConfig::default());
        let state = grid.state();
        assert_eq!(state.search_term, "");
        assert_eq!(state.current_page, 1);
        assert_eq!(state.page_size, 10);
        assert_eq!(state.sort_key, None);
        assert_eq!(grid.total_pages(), 0);
        assert!(grid.page_items().is_empty());
    }

    #[test]
    fn request_sort_toggles_on_same_key() {
        let mut grid: GridController = GridController::new(GridConfig::default());
        grid.set_data(numbered(3));

        grid.request_sort("id");
        assert_eq!(grid.state().sort_direction, SortDirection::Ascending);
        grid.request_sort("id");
        assert_eq!(grid.state().sort_direction, SortDirection::Descending);
        assert_eq!(page_ids(&grid), vec![3, 2, 1]);
        grid.request_sort("id");
        assert_eq!(grid.state().sort_direction, SortDirection::Ascending);

        grid.request_sort("id");
        grid.request_sort("other");
        assert_eq!(grid.state().sort_key.as_deref(), Some("other"));
        assert_eq!(grid.state().sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn request_sort_disabled_is_noop() {
        let config = GridConfig { sortable: false, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(3));
        grid.request_sort("id");
        assert_eq!(grid.state().sort_key, None);
        assert_eq!(page_ids(&grid), vec![1, 2, 3]);
    }

    #[test]
    fn search_ignored_when_not_searchable() {
        let config = GridConfig { searchable: false, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(3));
        grid.set_search_term("2");
        assert_eq!(grid.state().search_term, "2");
        assert_eq!(grid.filtered_len(), 3);
    }

    #[test]
    fn set_data_keeps_page_but_clamps() {
        let config = GridConfig { page_size: 2, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(9));
        grid.set_page(4);
        assert_eq!(grid.state().current_page, 4);

        grid.set_data(numbered(10));
        assert_eq!(grid.state().current_page, 4);
        assert_eq!(page_ids(&grid), vec![7, 8]);

        grid.set_data(numbered(3));
        assert_eq!(grid.state().current_page, 2);
        assert_eq!(page_ids(&grid), vec![3]);

        grid.set_data(Vec::new());
        assert_eq!(grid.state().current_page, 1);
        assert!(grid.page_items().is_empty());
    }

    #[test]
    fn search_resets_to_first_page() {
        let config = GridConfig { page_size: 2, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(12));
        grid.set_page(3);
        grid.set_search_term("1");
        assert_eq!(grid.state().current_page, 1);
        // 1, 10, 11, 12
        assert_eq!(grid.filtered_len(), 4);
        assert_eq!(page_ids(&grid), vec![1, 10]);
    }

    #[test]
    fn set_page_clamps_into_range() {
        let config = GridConfig { page_size: 2, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(5));
        grid.set_page(0);
        assert_eq!(grid.state().current_page, 1);
        grid.set_page(99);
        assert_eq!(grid.state().current_page, 3);
        grid.next_page();
        assert_eq!(grid.state().current_page, 3);
        grid.prev_page();
        grid.prev_page();
        grid.prev_page();
        assert_eq!(grid.state().current_page, 1);
        grid.last_page();
        assert_eq!(page_ids(&grid), vec![5]);
    }

    #[test]
    fn page_size_normalized_and_page_clamped() {
        let mut grid: GridController = GridController::new(GridConfig { page_size: 0, ..GridConfig::default() });
        assert_eq!(grid.state().page_size, 1);
        grid.set_data(numbered(6));
        grid.set_page(6);
        grid.set_page_size(4);
        assert_eq!(grid.state().page_size, 4);
        assert_eq!(grid.state().current_page, 2);
        assert_eq!(page_ids(&grid), vec![5, 6]);
        grid.set_page_size(0);
        assert_eq!(grid.state().page_size, 1);
    }

    #[test]
    fn reset_pagination_clears_search_and_page() {
        let config = GridConfig { page_size: 1, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(5));
        grid.set_search_term("");
        grid.set_page(4);
        grid.set_search_term("5");
        grid.reset_pagination();
        assert_eq!(grid.state().search_term, "");
        assert_eq!(grid.state().current_page, 1);
        assert_eq!(grid.filtered_len(), 5);
    }

    #[test]
    fn sort_survives_set_data() {
        let mut grid: GridController = GridController::new(GridConfig::default());
        grid.set_data(numbered(3));
        grid.request_sort("id");
        grid.request_sort("id");
        grid.set_data(numbered(4));
        assert_eq!(page_ids(&grid), vec![4, 3, 2, 1]);
    }

    #[test]
    fn columns_inferred_until_explicit() {
        let mut grid: GridController = GridController::new(GridConfig::default());
        grid.set_data(vec![Record::new().with("id", 1).with("name", "a")]);
        assert_eq!(grid.columns().len(), 2);

        grid.set_columns(Some(vec![Column::new("name", "Name").render(|v, _, _| {
            Value::from(v.text().to_uppercase())
        })]));
        assert_eq!(grid.rendered_page(), vec![vec![Value::from("A")]]);
    }

    #[test]
    fn snapshot_reflects_state() {
        let config = GridConfig { page_size: 2, ..GridConfig::default() };
        let mut grid: GridController = GridController::new(config);
        grid.set_data(numbered(5));
        grid.request_sort("id");
        grid.set_page(2);

        let snap = grid.snapshot();
        assert_eq!(snap.total_pages, 3);
        assert_eq!(snap.current_page, 2);
        assert_eq!(snap.search_term, "");
        assert_eq!(snap.sort_key, Some("id"));
        assert_eq!(snap.sort_direction, SortDirection::Ascending);
        assert_eq!(snap.page_items.len(), 2);
    }
}
