//! View assembler: the render-ready projection.

use serde::Serialize;
use serde::Serializer;

use crate::error::IngestError;
use crate::model::Column;
use crate::model::Fields;
use crate::model::Identity;
use crate::model::Row;
use crate::page::PageInfo;
use crate::page::PageWindow;
use crate::selection::SelectionSet;
use crate::selection::SelectionSummary;
use crate::sort::SortEngine;
use crate::sort::SortKey;

/// One row on the visible page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRow {
    /// Row identity, passed back by the presentation layer on toggle.
    pub identity: Identity,
    /// Ingestion position.
    pub position: usize,
    /// Row fields.
    pub fields: Fields,
    /// Checkbox state.
    pub selected: bool,
}

/// Everything the presentation layer needs to draw the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    /// Column schema for headers.
    pub columns: Vec<Column>,
    /// Rows of the current page in display order.
    pub visible_rows: Vec<VisibleRow>,
    /// Page metadata.
    pub pagination: PageInfo,
    /// Page sizes the user can pick from.
    pub page_sizes: Vec<usize>,
    /// Selection count over the whole snapshot.
    pub selection_summary: SelectionSummary,
    /// Active sort key, `None` for ingestion order.
    pub sort_state: Option<SortKey>,
}

impl ViewModel {
    /// Returns the identities on the visible page, in order.
    pub fn visible_identities(&self) -> Vec<&str> {
        self.visible_rows
            .iter()
            .map(|row| row.identity.as_str())
            .collect()
    }
}

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum ViewState {
    /// The host binding lacks an identity; the user must configure it.
    NeedsConfiguration(#[serde(serialize_with = "serialize_display")] IngestError),
    /// The snapshot has no rows.
    NoData,
    /// Rows are available.
    Ready(ViewModel),
}

impl ViewState {
    /// Returns the view model when rows are available.
    pub fn view_model(&self) -> Option<&ViewModel> {
        match self {
            ViewState::Ready(model) => Some(model),
            _ => None,
        }
    }

    /// Returns `true` if rows are available.
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }
}

fn serialize_display<S: Serializer>(error: &IngestError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Builds the view model for one page.
///
/// `order` holds indices into `rows` in display order; `window` selects the
/// page out of it. Selection flags are read, never written.
pub fn assemble<T>(
    rows: &[Row<T>],
    order: &[usize],
    window: &PageWindow,
    selection: &SelectionSet,
    sort: &SortEngine,
    page_sizes: &[usize],
) -> ViewModel {
    let visible_rows = window
        .slice(order)
        .iter()
        .map(|&i| {
            let row = &rows[i];
            VisibleRow {
                identity: row.identity().clone(),
                position: row.position(),
                fields: row.fields().clone(),
                selected: selection.is_selected(row.identity().as_str()),
            }
        })
        .collect();

    ViewModel {
        columns: sort.columns().to_vec(),
        visible_rows,
        pagination: window.info.clone(),
        page_sizes: page_sizes.to_vec(),
        selection_summary: selection.summary(rows),
        sort_state: sort.key().cloned(),
    }
}
