//! Table view controller
//!
//! [`TableView`] owns a [`ViewState`] and turns user actions into fetches.
//! An action updates the state, bumps the generation and hands back a
//! [`PendingFetch`]. The caller runs the fetch and passes the outcome to
//! [`TableView::commit`], which drops it if a newer action was issued in the
//! meantime. Superseded fetches still run to completion; they are ignored.
//!
//! Until the table's schema has loaded, every fetch also requests it. A
//! schema that arrives with a superseded fetch is still kept when it belongs
//! to the open table.
//!
//! Pages are requested with `limit` and `offset = (page - 1) * page_size`,
//! so the rows endpoint must honour `offset`. A server that pages only by
//! `page` would answer every page with its first page.
//!
//! # Example
//!
//! ```rust,no_run
//! # use tablekit_sdk::{Client, config::ViewConfig, view::TableView};
//! # async fn example(client: Client) {
//! let mut view = TableView::new(client, ViewConfig::default());
//! let fetch = view.open_table("orders");
//! view.commit(fetch.run().await);
//!
//! if let Some(fetch) = view.next_page() {
//!     view.commit(fetch.run().await);
//! }
//! # }
//! ```

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::debounce::{SearchDebouncer, SearchTicket};
use super::pagination::{PageItem, has_next, has_prev, page_window, showing_label};
use super::state::ViewState;
use crate::client::{Client, RawClient};
use crate::config::ViewConfig;
use crate::envelope::QueryResult;
use crate::error::{ApiError, ApiResult};
use crate::query::{PreparedQuery, Predicate, SortDirection, total_pages};
use crate::request::segment;
use crate::row::{Row, RowId, cell_text, resolve_row_id};
use crate::schema::{FormField, TableSchema, insert_form_fields};

/// Lifecycle of the view between actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Rendered,
    Error(String),
}

/// Whether a fetch outcome was applied to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Applied,
    Stale,
}

/// The last page of rows accepted by the view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageData {
    pub rows: Vec<Row>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

/// A fetch issued for one generation of the view state
pub struct PendingFetch {
    generation: u64,
    table: String,
    query: PreparedQuery,
    schema: Option<RawClient>,
}

impl PendingFetch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Path and query string of the row request
    pub fn path(&self) -> Option<&str> {
        self.query.path()
    }

    /// Whether this fetch also loads the table schema
    pub fn loads_schema(&self) -> bool {
        self.schema.is_some()
    }

    /// Run the schema request (while the schema is unknown) and the row request
    pub async fn run(self) -> FetchOutcome {
        let schema = match self.schema {
            Some(raw) => Some(raw.table_schema(&self.table).await),
            None => None,
        };
        let result = self.query.send().await;
        FetchOutcome {
            generation: self.generation,
            table: self.table,
            result,
            schema,
        }
    }
}

/// Response to a [`PendingFetch`], not yet committed
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    /// Table the fetch was issued for
    pub table: String,
    pub result: QueryResult,
    pub schema: Option<ApiResult<TableSchema>>,
}

/// Column header of the rendered table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub name: String,
    pub data_type: Option<String>,
    /// Set on the column the view is sorted by
    pub sort: Option<SortDirection>,
}

impl ColumnHeader {
    /// `▲` / `▼` on the sorted column, empty elsewhere
    pub fn sort_indicator(&self) -> &'static str {
        match self.sort {
            Some(SortDirection::Asc) => "▲",
            Some(SortDirection::Desc) => "▼",
            None => "",
        }
    }
}

/// One rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow {
    pub id: RowId,
    /// `id` as a literal for generated handler calls
    pub handler_id: String,
    pub cells: Vec<String>,
    pub selected: bool,
}

/// Display model of the committed page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub table: String,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<RenderRow>,
    pub page: u64,
    pub total: u64,
    pub pages: Vec<PageItem>,
    pub has_prev: bool,
    pub has_next: bool,
    pub showing: String,
}

/// What the view should display right now
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    /// No table opened yet
    Empty,
    Loading,
    Error(String),
    Table(RenderModel),
}

/// Paginated, sortable, filterable view over one table at a time
pub struct TableView {
    client: Client,
    config: ViewConfig,
    state: ViewState,
    generation: u64,
    phase: ViewPhase,
    schema: Option<TableSchema>,
    page: Option<PageData>,
    debouncer: SearchDebouncer,
}

impl TableView {
    pub fn new(client: Client, config: ViewConfig) -> Self {
        let debouncer = SearchDebouncer::new(Duration::from_millis(config.search_debounce_ms));
        Self {
            client,
            state: ViewState::new(config.page_size),
            config,
            generation: 0,
            phase: ViewPhase::Idle,
            schema: None,
            page: None,
            debouncer,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    pub fn page(&self) -> Option<&PageData> {
        self.page.as_ref()
    }

    /// Switch to `table`, resetting filters, sort, search, selection and page
    pub fn open_table(&mut self, table: impl Into<String>) -> PendingFetch {
        let table = table.into();
        info!("Opening table '{}'", table);
        self.debouncer.cancel();
        self.state.reset_for_table(table);
        self.schema = None;
        self.page = None;
        self.issue()
    }

    /// Header click: flip the direction on the sorted column, otherwise sort ascending
    pub fn sort_by(&mut self, column: &str) -> PendingFetch {
        self.state.toggle_sort(column);
        self.state.current_page = 1;
        self.issue()
    }

    /// Replace the active filters (explicit apply)
    pub fn apply_filters(&mut self, filters: Vec<Predicate>) -> PendingFetch {
        self.state.filters = filters;
        self.state.current_page = 1;
        self.issue()
    }

    /// Drop filters and search and refetch the unfiltered view
    pub fn clear_filters(&mut self) -> PendingFetch {
        self.debouncer.cancel();
        self.state.filters.clear();
        self.state.search = None;
        self.state.current_page = 1;
        self.issue()
    }

    /// Keystroke in the search box
    ///
    /// Await [`SearchTicket::settled`] and pass the text to
    /// [`apply_search`](Self::apply_search); only the last keystroke settles.
    pub fn search_input(&self, text: impl Into<String>) -> SearchTicket {
        self.debouncer.input(text)
    }

    /// Fire a search
    ///
    /// Input shorter than the configured minimum (after trimming) clears
    /// filters and search instead.
    pub fn apply_search(&mut self, text: &str) -> PendingFetch {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.min_search_chars {
            self.state.filters.clear();
            self.state.search = None;
        } else {
            self.state.search = Some(trimmed.to_string());
        }
        self.state.current_page = 1;
        self.issue()
    }

    /// Jump to `page`; `None` when it is outside the known page range
    pub fn go_to_page(&mut self, page: u64) -> Option<PendingFetch> {
        if page == 0 || page > self.total_pages().max(1) {
            return None;
        }
        self.state.current_page = page;
        Some(self.issue())
    }

    pub fn prev_page(&mut self) -> Option<PendingFetch> {
        if !has_prev(self.state.current_page) {
            return None;
        }
        self.go_to_page(self.state.current_page - 1)
    }

    pub fn next_page(&mut self) -> Option<PendingFetch> {
        if !has_next(self.state.current_page, self.total_pages()) {
            return None;
        }
        self.go_to_page(self.state.current_page + 1)
    }

    /// Refetch the current page with the current state
    pub fn refresh(&mut self) -> PendingFetch {
        self.issue()
    }

    /// Apply a fetch outcome if it belongs to the current generation
    pub fn commit(&mut self, outcome: FetchOutcome) -> CommitStatus {
        let FetchOutcome {
            generation,
            table,
            result,
            schema,
        } = outcome;

        let schema = match schema {
            Some(Ok(schema))
                if self.schema.is_none()
                    && self.state.current_table.as_deref() == Some(table.as_str()) =>
            {
                self.schema = Some(schema);
                None
            }
            other => other,
        };

        if generation != self.generation {
            debug!(
                "Discarding stale response for generation {} (current {})",
                generation, self.generation
            );
            return CommitStatus::Stale;
        }

        // rows still render, with headers taken from the rows
        if let Some(Err(e)) = schema {
            warn!("Schema of '{}' failed to load: {}", table, e);
        }

        if let Some(error) = result.error {
            debug!("Fetch failed: {}", error);
            self.phase = ViewPhase::Error(error);
            return CommitStatus::Applied;
        }
        let rows = result.data.unwrap_or_default();
        let total = result.count;
        self.page = Some(PageData {
            rows,
            total,
            page: self.state.current_page,
            total_pages: total_pages(total, self.state.page_size),
        });
        self.state.selected_rows.clear();
        self.phase = ViewPhase::Rendered;
        CommitStatus::Applied
    }

    /// Display model; a rendered or failed phase settles back to idle
    pub fn render(&mut self) -> Render {
        let render = match (&self.phase, &self.page, &self.state.current_table) {
            (ViewPhase::Loading, _, _) => Render::Loading,
            (ViewPhase::Error(message), _, _) => Render::Error(message.clone()),
            (_, Some(page), Some(table)) => Render::Table(self.render_model(table, page)),
            _ => Render::Empty,
        };
        if matches!(self.phase, ViewPhase::Rendered | ViewPhase::Error(_)) {
            self.phase = ViewPhase::Idle;
        }
        render
    }

    /// Total pages of the last committed page, zero before the first commit
    pub fn total_pages(&self) -> u64 {
        self.page.as_ref().map_or(0, |p| p.total_pages)
    }

    /// Identifiers of the rows on the committed page, in display order
    pub fn visible_row_ids(&self) -> Vec<RowId> {
        let pk = self.primary_key();
        self.page
            .as_ref()
            .map(|page| {
                page.rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| resolve_row_id(row, pk, i))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn toggle_row(&mut self, id: impl Into<RowId>) -> bool {
        self.state.toggle_selected(id.into())
    }

    /// Select every row on the current page
    pub fn select_visible(&mut self) {
        let ids = self.visible_row_ids();
        self.state.selected_rows.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_rows.clear();
    }

    /// Fields of the insert form; auto-increment keys are skipped
    pub fn insert_form(&self) -> Vec<FormField> {
        self.schema
            .as_ref()
            .map(insert_form_fields)
            .unwrap_or_default()
    }

    /// Convert raw form input into a row, coercing by each column's input kind
    ///
    /// Unknown fields are kept as text.
    pub fn form_values<'a>(&self, raw: impl IntoIterator<Item = (&'a str, &'a str)>) -> Row {
        raw.into_iter()
            .map(|(name, value)| {
                let coerced = match self.schema.as_ref().and_then(|s| s.column(name)) {
                    Some(column) => column.input_kind().coerce(value),
                    None => Value::from(value),
                };
                (name.to_string(), coerced)
            })
            .collect()
    }

    /// Delete one row, then refetch
    pub async fn delete_row(&mut self, id: impl Into<RowId>) -> ApiResult<PendingFetch> {
        let path = self.row_path(&id.into())?;
        self.client.raw().delete(&path, None).await?;
        Ok(self.issue())
    }

    /// Delete every selected row, then refetch
    ///
    /// Stops at the first failure; rows deleted before it stay deleted.
    pub async fn delete_selected(&mut self) -> ApiResult<PendingFetch> {
        if self.state.selected_rows.is_empty() {
            return Err(ApiError::MissingState("No rows selected".to_string()));
        }
        let raw = self.client.raw();
        let ids: Vec<RowId> = self.state.selected_rows.iter().cloned().collect();
        info!("Deleting {} selected rows", ids.len());
        for id in &ids {
            let path = self.row_path(id)?;
            raw.delete(&path, None).await?;
            self.state.selected_rows.remove(id);
        }
        Ok(self.issue())
    }

    /// Insert a row, then refetch
    pub async fn insert_row(&mut self, values: Row) -> ApiResult<PendingFetch> {
        let path = format!("{}rows/", self.table_path()?);
        self.client.raw().post(&path, Value::Object(values)).await?;
        Ok(self.issue())
    }

    /// Update a row, then refetch
    pub async fn update_row(&mut self, id: impl Into<RowId>, values: Row) -> ApiResult<PendingFetch> {
        let path = self.row_path(&id.into())?;
        self.client.raw().put(&path, Value::Object(values)).await?;
        Ok(self.issue())
    }

    fn issue(&mut self) -> PendingFetch {
        self.generation += 1;
        self.phase = ViewPhase::Loading;

        let table = self.state.current_table.clone().unwrap_or_default();
        let schema = (self.schema.is_none() && !table.trim().is_empty())
            .then(|| self.client.raw());
        let mut builder = self.client.from(table.clone());
        builder
            .limit(self.state.page_size)
            .offset(self.state.offset());
        if let Some(search) = &self.state.search {
            builder.search(search.clone());
        }
        if let Some(column) = &self.state.sort_column {
            builder.order_by(column.clone(), self.state.sort_direction);
        }
        for predicate in &self.state.filters {
            builder.filter(predicate.clone());
        }
        debug!(
            "Issuing fetch generation {}: {}",
            self.generation,
            builder.query_string()
        );

        PendingFetch {
            generation: self.generation,
            table,
            query: builder.prepare(),
            schema,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        self.schema.as_ref().and_then(|s| s.primary_key())
    }

    fn table_path(&self) -> ApiResult<String> {
        match self.state.current_table.as_deref() {
            Some(table) if !table.trim().is_empty() => Ok(format!("/tables/{}/", segment(table))),
            _ => Err(ApiError::MissingState("No table selected".to_string())),
        }
    }

    fn row_path(&self, id: &RowId) -> ApiResult<String> {
        let table = self.table_path()?;
        Ok(format!("{}rows/{}/", table, segment(&id.to_string())))
    }

    fn render_model(&self, table: &str, page: &PageData) -> RenderModel {
        let columns: Vec<ColumnHeader> = match &self.schema {
            Some(schema) => schema
                .columns
                .iter()
                .map(|c| (c.name.clone(), Some(c.data_type.clone())))
                .collect::<Vec<_>>(),
            None => page
                .rows
                .first()
                .map(|row| row.keys().map(|k| (k.clone(), None)).collect())
                .unwrap_or_default(),
        }
        .into_iter()
        .map(|(name, data_type)| ColumnHeader {
            sort: (self.state.sort_column.as_deref() == Some(name.as_str()))
                .then_some(self.state.sort_direction),
            name,
            data_type,
        })
        .collect();

        let pk = self.primary_key();
        let rows = page
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let id = resolve_row_id(row, pk, i);
                RenderRow {
                    handler_id: id.handler_literal(),
                    cells: columns.iter().map(|c| cell_text(row.get(&c.name))).collect(),
                    selected: self.state.selected_rows.contains(&id),
                    id,
                }
            })
            .collect();

        RenderModel {
            table: table.to_string(),
            columns,
            rows,
            page: page.page,
            total: page.total,
            pages: page_window(page.total_pages, page.page),
            has_prev: has_prev(page.page),
            has_next: has_next(page.page, page.total_pages),
            showing: showing_label(page.page, self.state.page_size, page.total),
        }
    }
}
