//! Table view state

use std::collections::BTreeSet;

use crate::query::{Predicate, SortDirection};
use crate::row::RowId;

/// Everything the table view needs to rebuild its current fetch
///
/// Owned by exactly one [`super::TableView`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub current_table: Option<String>,
    /// 1-based
    pub current_page: u64,
    pub page_size: u64,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    pub filters: Vec<Predicate>,
    pub search: Option<String>,
    pub selected_rows: BTreeSet<RowId>,
}

impl ViewState {
    pub fn new(page_size: u64) -> Self {
        Self {
            current_table: None,
            current_page: 1,
            page_size: page_size.max(1),
            sort_column: None,
            sort_direction: SortDirection::Asc,
            filters: Vec::new(),
            search: None,
            selected_rows: BTreeSet::new(),
        }
    }

    /// Switch to `table`, dropping filters, sort, search, selection and page
    pub fn reset_for_table(&mut self, table: impl Into<String>) {
        let page_size = self.page_size;
        *self = Self::new(page_size);
        self.current_table = Some(table.into());
    }

    /// Same column flips the direction, a new column sorts ascending
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort_column.as_deref() == Some(column) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = Some(column.to_string());
            self.sort_direction = SortDirection::Asc;
        }
    }

    /// Row offset of the first row on the current page
    pub fn offset(&self) -> u64 {
        (self.current_page.max(1) - 1) * self.page_size
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty() || self.search.is_some()
    }

    /// Toggle one row in the selection; returns whether it is now selected
    pub fn toggle_selected(&mut self, id: RowId) -> bool {
        if self.selected_rows.remove(&id) {
            false
        } else {
            self.selected_rows.insert(id);
            true
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(crate::config::ViewConfig::default().page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_sort() {
        let mut state = ViewState::default();
        state.toggle_sort("name");
        assert_eq!(state.sort_column.as_deref(), Some("name"));
        assert_eq!(state.sort_direction, SortDirection::Asc);

        state.toggle_sort("name");
        assert_eq!(state.sort_direction, SortDirection::Desc);

        state.toggle_sort("price");
        assert_eq!(state.sort_column.as_deref(), Some("price"));
        assert_eq!(state.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_reset_for_table_keeps_page_size() {
        let mut state = ViewState::new(10);
        state.current_table = Some("a".into());
        state.current_page = 4;
        state.toggle_sort("x");
        state.filters.push(Predicate::eq("x", 1));
        state.search = Some("abc".into());
        state.toggle_selected(RowId::Int(1));

        state.reset_for_table("b");
        assert_eq!(state.current_table.as_deref(), Some("b"));
        assert_eq!(state.current_page, 1);
        assert_eq!(state.page_size, 10);
        assert!(state.sort_column.is_none());
        assert!(!state.is_filtered());
        assert!(state.selected_rows.is_empty());
    }

    #[test]
    fn test_offset_and_selection() {
        let mut state = ViewState::new(25);
        state.current_page = 3;
        assert_eq!(state.offset(), 50);

        assert!(state.toggle_selected(RowId::from("a")));
        assert!(!state.toggle_selected(RowId::from("a")));
        assert!(state.selected_rows.is_empty());
    }
}
