//! Interactive schema explorer built on ratatui.
//!
//! # Architecture
//!
//! [`Controller`] is the root state machine and the only owner of mutable UI
//! state. Leaves first:
//!
//! - [`scanner`] turns a metadata snapshot into tree entries
//! - [`tree::NodeTree`] holds the search-filtered hierarchy
//! - [`list::ListView`] flattens it under a cursor and viewport
//! - [`search::SearchBar`] edits the filter text
//! - [`details::DetailsPane`] shows the rows of the opened entity
//!
//! Database access never happens on the UI thread: the controller emits
//! [`Task`]s, the [`Scheduler`] runs them on tokio, and results come back as
//! [`Event`]s through the [`EventHandler`] queue.

pub mod controller;
pub mod details;
pub mod events;
pub mod list;
pub mod scanner;
pub mod scheduler;
pub mod search;
pub mod state;
pub mod status;
pub mod theme;
pub mod tree;
mod ui;
pub mod widgets;

pub use controller::{Controller, Mode, PaneLayout};
pub use details::{format_value, DetailsPane, DetailsState, SelectionTag};
pub use events::{Event, EventHandler};
pub use list::ListView;
pub use scanner::ScanEntry;
pub use scheduler::{Scheduler, Task};
pub use search::{SearchBar, SearchOutcome, SearchState};
pub use state::ListNavigation;
pub use status::{NoticeLevel, StatusNotice};
pub use theme::{colors, set_theme, toggle_theme, ColorScheme, Styles, Theme};
pub use tree::{NodeId, NodeKind, NodeTree};
pub use ui::{render, run_tui};
