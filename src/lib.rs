//! **A terminal explorer for Cassandra and ScyllaDB keyspace schemas.**
//!
//! `cql-tui` connects to a cluster, takes a snapshot of one keyspace's schema
//! objects and presents them as a collapsible, searchable tree. Opening an entity
//! loads its rows (or its `system_schema` definition) into a details pane, with
//! optional JSON pretty-printing.
//!
//! ## Modules
//!
//! - **[`metadata`]**: the [`MetadataSource`] boundary and its `scylla` driver
//!   implementation, [`ScyllaSource`].
//! - **[`tui`]**: the tree, list, search and details state machines and the
//!   [`Controller`] that ties them together.
//! - **[`config`]**: YAML configuration, key bindings and validation.
//! - **[`error`]**: the crate-wide [`CqlTuiError`].
//!
//! ## Driving the controller without a terminal
//!
//! The controller is plain state: feed it events, get tasks back.
//!
//! ```
//! use cql_tui::config::{KeyBindings, Keymap};
//! use cql_tui::tui::{Controller, Event, ScanEntry};
//!
//! let keymap = Keymap::from_bindings(&KeyBindings::default()).unwrap();
//! let mut controller = Controller::new("shop".into(), vec!["127.0.0.1:9042".into()], keymap, true);
//! controller.handle_event(Event::Resize(120, 40));
//! controller.handle_event(Event::ScanFinished {
//!     generation: 1,
//!     result: Ok(vec![ScanEntry { parents: vec![], label: "Tables".into() }]),
//! });
//! assert_eq!(controller.list().rows().len(), 1);
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // u16/usize conversions are pervasive in layout math and bounded by terminal size
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // TUI render functions are inherently long
    clippy::too_many_lines,
    clippy::module_name_repetitions
)]

pub mod config;
pub mod error;
pub mod metadata;
pub mod tui;

pub use config::{AppConfig, ConfigError, TuiConfig, Validatable};
pub use error::{CqlTuiError, Result};
pub use metadata::{
    Category, DetailRow, EntityPath, KeyspaceMetadata, MetadataSource, ScyllaSource, UserType,
};
pub use tui::Controller;
