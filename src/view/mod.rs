//! Table view
//!
//! - `state`: view state owned by one controller
//! - `pagination`: page-button window and row range
//! - `debounce`: last-keystroke-wins search input
//! - `controller`: actions, stale-response guard and render model

pub mod controller;
pub mod debounce;
pub mod pagination;
pub mod state;

pub use controller::{
    ColumnHeader, CommitStatus, FetchOutcome, PageData, PendingFetch, Render, RenderModel,
    RenderRow, TableView, ViewPhase,
};
pub use debounce::{SearchDebouncer, SearchTicket};
pub use pagination::{PageItem, page_window};
pub use state::ViewState;
