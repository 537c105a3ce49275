//! API utilities for frontend-backend communication
//!
//! The backend serves both the built frontend and the grid endpoints, so
//! requests go to the origin the page was loaded from.

/// Get the base URL for API requests
///
/// # Returns
/// - Page origin like "http://localhost:8080"
/// - Empty string if window is not available (relative URLs are used then)
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    window.location().origin().unwrap_or_default()
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/cities/items?page_index=1&page_size=10");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
