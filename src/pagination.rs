//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum number of merchants to display per page.
    pub page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            page_size: 10,
        }
    }
}

/// The state of the Prev/Next controls under a paged table.
#[derive(Debug, PartialEq, Eq)]
pub struct PageControls {
    /// The page to go to with the "Prev" button, `None` disables the button.
    pub prev: Option<u64>,
    /// The page to go to with the "Next" button, `None` disables the button.
    pub next: Option<u64>,
    pub current_page: u64,
    /// The page count shown to the user, at least one even for an empty table.
    pub display_total: u64,
}

impl PageControls {
    pub fn new(current_page: u64, total_pages: u64) -> Self {
        let prev = (current_page > 1).then(|| current_page - 1);
        let next = (total_pages != 0 && current_page < total_pages).then(|| current_page + 1);

        Self {
            prev,
            next,
            current_page,
            display_total: total_pages.max(1),
        }
    }

    /// The label between the buttons, e.g. "Page 2 of 5".
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.display_total)
    }
}
