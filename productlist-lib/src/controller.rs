//! List controller: the single owner of rows, sort, paging and selection.
//!
//! Every operation updates local state synchronously and returns the fresh
//! [`ViewState`]. Selection operations additionally dispatch a sync to the
//! authority, which the caller never waits for.

use std::sync::Arc;

use log::debug;
use tokio::runtime::Handle;

use crate::config::ControllerConfig;
use crate::error::ConfigError;
use crate::error::IngestError;
use crate::error::ViewError;
use crate::model::Identity;
use crate::model::Row;
use crate::observe::NoopObserver;
use crate::observe::SyncObserver;
use crate::page::Paginator;
use crate::selection::Reconciler;
use crate::selection::SelectionAuthority;
use crate::selection::SelectionSummary;
use crate::selection::SyncState;
use crate::sort::Collator;
use crate::sort::SortEngine;
use crate::sort::SortKey;
use crate::source::RawRow;
use crate::source::RowResolver;
use crate::store;
use crate::store::RowStore;
use crate::view;
use crate::view::ViewState;

/// Paginated, sortable list with a selection mirrored to an authority.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use productlist_lib::config::ControllerConfig;
/// use productlist_lib::controller::ListController;
/// use productlist_lib::model::Column;
/// use productlist_lib::selection::InMemoryAuthority;
/// use productlist_lib::source::RawRow;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = ControllerConfig::default().with_columns(vec![Column::text("name", "Name")]);
/// let authority = Arc::new(InMemoryAuthority::new());
/// let mut list = ListController::new(config, authority.clone()).unwrap();
///
/// list.refresh(vec![
///     RawRow::new("A").field("name", "Alpha"),
///     RawRow::new("B").field("name", "Beta"),
/// ]);
/// list.toggle("B");
/// assert_eq!(list.selection_summary().count, 1);
///
/// list.flush().await;
/// assert_eq!(authority.selected_identities().len(), 1);
/// # }
/// ```
pub struct ListController<A: SelectionAuthority> {
    config: ControllerConfig,
    store: RowStore<A::Token>,
    sort: SortEngine,
    pages: Paginator,
    reconciler: Reconciler<A>,
    observer: Arc<dyn SyncObserver>,
    ingest_error: Option<IngestError>,
    order: Vec<usize>,
    view: ViewState,
}

impl<A: SelectionAuthority> ListController<A> {
    /// Creates a controller with no data.
    ///
    /// Until the first refresh the view is [`ViewState::NoData`].
    pub fn new(config: ControllerConfig, authority: Arc<A>) -> Result<Self, ConfigError> {
        config.validate()?;
        let sort = SortEngine::new(config.columns.clone(), Collator::new(&config.locale));
        let pages = Paginator::new(config.default_page_size);
        let reconciler =
            Reconciler::new(authority).with_supersede_stale(config.supersede_stale_syncs);

        Ok(Self {
            config,
            store: RowStore::new(),
            sort,
            pages,
            reconciler,
            observer: Arc::new(NoopObserver),
            ingest_error: Some(IngestError::EmptyDataset),
            order: Vec::new(),
            view: ViewState::NoData,
        })
    }

    /// Sets the observer for view updates and selection syncs.
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.reconciler = self.reconciler.with_observer(Arc::clone(&observer));
        self.observer = observer;
        self
    }

    /// Pins the runtime selection syncs are spawned on.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.reconciler = self.reconciler.with_runtime(runtime);
        self
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replaces the snapshot with already-resolved rows.
    ///
    /// The selection, sort key and page size survive; the page index is
    /// clamped to the new row count. No sync is dispatched.
    pub fn refresh(&mut self, raw: Vec<RawRow>) -> &ViewState {
        let result = store::ingest(raw, &**self.reconciler.authority());
        self.apply_ingest(result)
    }

    /// Resolves a host snapshot and replaces the current one with it.
    pub fn refresh_with<R: RowResolver>(&mut self, resolver: &R, input: &R::Input) -> &ViewState {
        let result = resolver
            .resolve(input)
            .and_then(|raw| store::ingest(raw, &**self.reconciler.authority()));
        self.apply_ingest(result)
    }

    fn apply_ingest(&mut self, result: Result<Vec<Row<A::Token>>, IngestError>) -> &ViewState {
        match result {
            Ok(rows) => {
                self.store.replace(rows);
                self.ingest_error = None;
            }
            Err(e) => {
                debug!("Snapshot not ingested: {}", e);
                self.store.clear();
                self.ingest_error = Some(e);
            }
        }
        self.reorder();
        self.emit()
    }

    /// Returns the rows of the current snapshot in ingestion order.
    pub fn rows(&self) -> &[Row<A::Token>] {
        self.store.rows()
    }

    /// Returns the last emitted view.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Flips the selection of one identity, visible or not.
    pub fn toggle(&mut self, identity: impl Into<Identity>) -> &ViewState {
        self.reconciler.toggle(identity.into(), self.store.rows());
        self.emit()
    }

    /// Deselects everything if the whole dataset is selected, else selects
    /// the whole dataset. Paging plays no part.
    pub fn toggle_all(&mut self) -> &ViewState {
        self.reconciler.toggle_all(self.store.rows());
        self.emit()
    }

    /// Check if an identity is selected.
    pub fn is_selected(&self, identity: &str) -> bool {
        self.reconciler.is_selected(identity)
    }

    /// Counts the selection against the current snapshot.
    pub fn selection_summary(&self) -> SelectionSummary {
        self.reconciler.summary(self.store.rows())
    }

    /// Selected identities present in the current snapshot, in ingestion order.
    pub fn selected_identities(&self) -> Vec<&Identity> {
        let mut seen = std::collections::HashSet::new();
        self.store
            .rows()
            .iter()
            .map(|row| row.identity())
            .filter(|identity| self.reconciler.is_selected(identity.as_str()))
            .filter(|identity| seen.insert(*identity))
            .collect()
    }

    /// Returns whether selection syncs are still running.
    pub fn sync_state(&self) -> SyncState {
        self.reconciler.sync_state()
    }

    /// Waits until every dispatched selection sync has settled.
    pub async fn flush(&mut self) {
        self.reconciler.flush().await;
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Header click: cycles ascending, descending, ingestion order.
    ///
    /// Returns to the first page.
    pub fn sort_by(&mut self, column: &str) -> Result<&ViewState, ViewError> {
        self.sort.cycle(column)?;
        Ok(self.resort())
    }

    /// Sets the sort key directly. Returns to the first page.
    pub fn set_sort(&mut self, key: Option<SortKey>) -> Result<&ViewState, ViewError> {
        self.sort.set_key(key)?;
        Ok(self.resort())
    }

    /// Returns the active sort key.
    pub fn sort_key(&self) -> Option<&SortKey> {
        self.sort.key()
    }

    fn resort(&mut self) -> &ViewState {
        self.pages.reset();
        self.reorder();
        self.emit()
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Moves to the next page. No-op on the last page.
    pub fn next_page(&mut self) -> &ViewState {
        self.pages.next();
        self.emit()
    }

    /// Moves to the previous page. No-op on the first page.
    pub fn previous_page(&mut self) -> &ViewState {
        self.pages.previous();
        self.emit()
    }

    /// Jumps to a page; beyond the end lands on the last page.
    pub fn go_to_page(&mut self, page_index: usize) -> &ViewState {
        self.pages.go_to(page_index);
        self.emit()
    }

    /// Jumps to the first page.
    pub fn first_page(&mut self) -> &ViewState {
        self.pages.reset();
        self.emit()
    }

    /// Jumps to the last page.
    pub fn last_page(&mut self) -> &ViewState {
        self.pages.go_to(usize::MAX);
        self.emit()
    }

    /// Picks one of the offered page sizes and returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<&ViewState, ViewError> {
        if !self.config.page_sizes.contains(&page_size) {
            return Err(ViewError::UnsupportedPageSize {
                requested: page_size,
                offered: self.config.page_sizes.clone(),
            });
        }
        debug!("Page size changed to {}", page_size);
        self.pages.set_page_size(page_size);
        Ok(self.emit())
    }

    /// Returns the current page index.
    pub fn page_index(&self) -> usize {
        self.pages.page_index()
    }

    /// Returns the current page size.
    pub fn page_size(&self) -> usize {
        self.pages.page_size()
    }

    // -------------------------------------------------------------------------
    // Projection
    // -------------------------------------------------------------------------

    fn reorder(&mut self) {
        self.order = self.sort.order(self.store.rows());
    }

    fn emit(&mut self) -> &ViewState {
        let window = self.pages.paginate(self.order.len());
        self.view = match &self.ingest_error {
            Some(e) if e.needs_configuration() => ViewState::NeedsConfiguration(e.clone()),
            Some(_) => ViewState::NoData,
            None => ViewState::Ready(view::assemble(
                self.store.rows(),
                &self.order,
                &window,
                self.reconciler.selection(),
                &self.sort,
                &self.config.page_sizes,
            )),
        };
        self.observer.on_update(&self.view);
        &self.view
    }
}

impl<A: SelectionAuthority> std::fmt::Debug for ListController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController")
            .field("rows", &self.store.len())
            .field("sort", &self.sort.key())
            .field("pages", &self.pages)
            .field("reconciler", &self.reconciler)
            .field("view_ready", &self.view.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::selection::InMemoryAuthority;

    fn controller() -> ListController<InMemoryAuthority> {
        let config = ControllerConfig::default()
            .with_columns(vec![Column::text("name", "Name"), Column::number("price", "Price")])
            .with_page_sizes(vec![2, 20])
            .with_default_page_size(2);
        ListController::new(config, Arc::new(InMemoryAuthority::new())).unwrap()
    }

    fn raw(ids: &[&str]) -> Vec<RawRow> {
        ids.iter()
            .map(|id| RawRow::new(*id).field("name", *id))
            .collect()
    }

    #[test]
    fn test_initial_view_is_no_data() {
        assert_eq!(controller().view(), &ViewState::NoData);
    }

    #[test]
    fn test_missing_identity_needs_configuration() {
        let mut list = controller();
        let mut rows = raw(&["a"]);
        rows[0].identity = None;
        assert!(matches!(list.refresh(rows), ViewState::NeedsConfiguration(_)));
        assert!(list.rows().is_empty());
    }

    #[test]
    fn test_empty_snapshot_is_no_data() {
        let mut list = controller();
        list.refresh(raw(&["a"]));
        assert_eq!(list.refresh(Vec::new()), &ViewState::NoData);
    }

    #[test]
    fn test_sort_resets_page() {
        let mut list = controller();
        list.refresh(raw(&["a", "b", "c", "d", "e"]));
        list.go_to_page(2);
        assert_eq!(list.page_index(), 2);
        list.sort_by("name").unwrap();
        assert_eq!(list.page_index(), 0);
    }

    #[test]
    fn test_invalid_sort_leaves_state() {
        let mut list = controller();
        list.refresh(raw(&["a", "b", "c"]));
        list.next_page();
        assert!(list.sort_by("missing").is_err());
        assert_eq!(list.page_index(), 1);
        assert!(list.sort_key().is_none());
    }

    #[test]
    fn test_unsupported_page_size() {
        let mut list = controller();
        let err = list.set_page_size(7).unwrap_err();
        assert_eq!(
            err,
            ViewError::UnsupportedPageSize {
                requested: 7,
                offered: vec![2, 20],
            }
        );
        assert_eq!(list.page_size(), 2);
    }

    #[test]
    fn test_last_and_first_page() {
        let mut list = controller();
        list.refresh(raw(&["a", "b", "c", "d", "e"]));
        let model = list.last_page().view_model().unwrap();
        assert_eq!(model.visible_identities(), vec!["e"]);
        assert_eq!(list.first_page().view_model().unwrap().pagination.page_index, 0);
    }
}
