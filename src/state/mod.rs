/// State management module
///
/// This module holds the data model and explicit application state:
/// - Shared data structures (data.rs)
/// - Selection / book-open state and the resolution guard (app.rs)

pub mod app;
pub mod data;
