//! Root state machine.
//!
//! The controller owns the tree, the search state and every pane. Each incoming
//! [`Event`] is dispatched here on the UI thread; anything that needs the database
//! comes back out as a [`Task`] for the scheduler, and its result returns later as
//! another event. Nothing in this module blocks or returns an error: post-startup
//! failures become a status notice or an in-place details message.

use super::details::DetailsPane;
use super::events::Event;
use super::list::ListView;
use super::scanner::ScanEntry;
use super::scheduler::Task;
use super::search::{SearchBar, SearchOutcome};
use super::status::StatusNotice;
use super::theme::toggle_theme;
use super::tree::{normalize_term, NodeKind, NodeTree};
use crate::config::Keymap;
use crate::metadata::{EntityPath, KeyspaceMetadata};
use crossterm::event::KeyEvent;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Rows outside the two panes: header (2), search bar, status, footer, pane borders (2).
pub const CHROME_ROWS: u16 = 7;
/// Columns each half-pane loses to its borders.
pub const PANE_MARGIN: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Searching,
}

/// Inner geometry shared by the tree and details panes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneLayout {
    pub pane_width: u16,
    pub pane_height: u16,
}

impl PaneLayout {
    #[must_use]
    pub const fn compute(width: u16, height: u16) -> Self {
        Self {
            pane_width: (width / 2).saturating_sub(PANE_MARGIN),
            pane_height: height.saturating_sub(CHROME_ROWS),
        }
    }
}

pub struct Controller {
    keyspace: String,
    addresses: Vec<String>,
    keymap: Keymap,
    mode: Mode,
    tree: NodeTree,
    list: ListView,
    search: SearchBar,
    details: DetailsPane,
    status: StatusNotice,
    layout: PaneLayout,
    /// Committed search term applied on every rebuild
    filter: String,
    /// Entries of the most recently applied scan
    entries: Vec<ScanEntry>,
    issued_generation: u64,
    applied_generation: u64,
    show_help: bool,
    tick: u64,
    should_quit: bool,
}

impl Controller {
    #[must_use]
    pub fn new(keyspace: String, addresses: Vec<String>, keymap: Keymap, pretty_json: bool) -> Self {
        Self {
            keyspace,
            addresses,
            keymap,
            mode: Mode::Normal,
            tree: NodeTree::new(),
            list: ListView::default(),
            search: SearchBar::new(),
            details: DetailsPane::new(pretty_json),
            status: StatusNotice::default(),
            layout: PaneLayout::default(),
            filter: String::new(),
            entries: Vec::new(),
            issued_generation: 0,
            applied_generation: 0,
            show_help: false,
            tick: 0,
            should_quit: false,
        }
    }

    /// First scan. A snapshot fetched during startup is reused instead of hitting the database again.
    pub fn init(&mut self, snapshot: Option<KeyspaceMetadata>) -> Vec<Task> {
        vec![self.next_scan(snapshot)]
    }

    /// Apply one event and return the background work it requires.
    pub fn handle_event(&mut self, event: Event) -> Vec<Task> {
        let mut queue = VecDeque::from([event]);
        let mut tasks = Vec::new();
        while let Some(event) = queue.pop_front() {
            self.dispatch(event, &mut queue, &mut tasks);
        }
        tasks
    }

    fn dispatch(&mut self, event: Event, queue: &mut VecDeque<Event>, tasks: &mut Vec<Task>) {
        match event {
            Event::Key(key) => self.on_key(&key, queue, tasks),
            Event::Resize(width, height) => self.on_resize(width, height),
            Event::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.status.expire();
            }
            Event::ScanFinished { generation, result } => self.on_scan(generation, result),
            Event::DetailsFetched { tag, result } => {
                let applied = self
                    .details
                    .apply(tag, result.map_err(|e| e.to_string()));
                debug!(tag = tag.0, applied, "details result");
            }
            Event::FilterChanged(filter) => {
                info!(filter = %filter, "filter changed");
                self.filter = filter;
                self.rebuild(true);
                self.list.reset_cursor();
                self.sync_details();
            }
        }
    }

    fn on_key(&mut self, key: &KeyEvent, queue: &mut VecDeque<Event>, tasks: &mut Vec<Task>) {
        if self.mode == Mode::Searching {
            match self.search.handle_key(key) {
                SearchOutcome::Submitted(query) => {
                    self.mode = Mode::Normal;
                    queue.push_back(Event::FilterChanged(query));
                }
                SearchOutcome::Consumed { .. } => {}
                SearchOutcome::Ignored => self.mode = Mode::Normal,
            }
            return;
        }

        if self.keymap.quit.matches(key) {
            info!("quit requested");
            self.should_quit = true;
        } else if self.keymap.search.matches(key) {
            self.mode = Mode::Searching;
            self.search.toggle_active(true);
        } else if self.keymap.enter.matches(key) {
            self.open_current(tasks);
        } else if self.keymap.scan.matches(key) {
            info!(filter = %self.filter, "rescan requested");
            tasks.push(self.next_scan(None));
        } else if self.keymap.help.matches(key) {
            self.show_help = !self.show_help;
        } else if self.keymap.theme.matches(key) {
            let name = toggle_theme();
            self.status.info(format!("Theme: {name}"));
        } else {
            self.forward(key);
        }
    }

    /// Offer an unbound key to the list, then the search bar, then the details pane.
    fn forward(&mut self, key: &KeyEvent) {
        if self.list.handle_key(key) {
            self.sync_details();
            return;
        }
        match self.search.handle_key(key) {
            SearchOutcome::Ignored | SearchOutcome::Consumed { changed: false } => {}
            SearchOutcome::Consumed { changed: true } | SearchOutcome::Submitted(_) => return,
        }
        self.details.handle_key(key);
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        self.layout = PaneLayout::compute(width, height);
        debug!(width, height, layout = ?self.layout, "resize");
        self.list
            .resize(self.layout.pane_width, self.layout.pane_height);
        self.details
            .resize(self.layout.pane_width, self.layout.pane_height);
    }

    fn on_scan(&mut self, generation: u64, result: crate::error::Result<Vec<ScanEntry>>) {
        if generation < self.applied_generation {
            debug!(
                generation,
                applied = self.applied_generation,
                "dropping stale scan result"
            );
            return;
        }
        self.applied_generation = generation;
        match result {
            Ok(entries) => {
                info!(generation, entries = entries.len(), "scan applied");
                self.entries = entries;
                self.rebuild(false);
                self.list.reset_cursor();
                self.sync_details();
            }
            Err(e) => {
                warn!(generation, error = %e, "rescan failed");
                self.status.error(format!("Rescan failed: {e}"));
            }
        }
    }

    /// Enter on the cursor row: expand or collapse a branch, open a leaf.
    fn open_current(&mut self, tasks: &mut Vec<Task>) {
        let Some(row) = self.list.current().cloned() else {
            return;
        };
        if row.has_children {
            self.tree.toggle_expand(row.id);
            self.list.refresh(&self.tree);
            return;
        }
        match row.kind {
            NodeKind::Root => {}
            NodeKind::Category => {
                self.status.info(format!("No entries under {}", row.label));
            }
            NodeKind::Entity | NodeKind::Field => {
                let Some(entity) = EntityPath::from_tree_path(&row.path) else {
                    warn!(path = ?row.path, "row does not resolve to an entity");
                    return;
                };
                let tag = self.details.begin(entity.clone());
                debug!(%entity, tag = tag.0, "fetching details");
                tasks.push(Task::FetchDetails { tag, entity });
            }
        }
    }

    fn next_scan(&mut self, snapshot: Option<KeyspaceMetadata>) -> Task {
        self.issued_generation += 1;
        Task::Scan {
            generation: self.issued_generation,
            snapshot,
        }
    }

    /// Rebuild the tree from the cached scan under the current filter.
    ///
    /// A new filter expands every match. Otherwise branches the user collapsed
    /// under the filter stay collapsed.
    fn rebuild(&mut self, filter_changed: bool) {
        let collapsed = if filter_changed {
            HashSet::new()
        } else {
            self.tree.collapsed_paths()
        };
        self.tree.clear();
        for entry in &self.entries {
            self.tree.add_child(&entry.parents, &entry.label, &self.filter);
        }
        if !normalize_term(&self.filter).is_empty() {
            self.tree.expand_all();
            self.tree.collapse_paths(&collapsed);
        }
        self.list.refresh(&self.tree);
    }

    /// Drop the details buffer once the cursor no longer points into its entity.
    fn sync_details(&mut self) {
        let Some(open) = self.details.entity() else {
            return;
        };
        let current = self
            .list
            .current()
            .and_then(|row| EntityPath::from_tree_path(&row.path));
        if current.as_ref() != Some(open) {
            debug!(entity = %open, "navigated away, discarding details");
            self.details.discard();
        }
    }

    #[must_use]
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    #[must_use]
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    #[must_use]
    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn tree(&self) -> &NodeTree {
        &self.tree
    }

    #[must_use]
    pub const fn list(&self) -> &ListView {
        &self.list
    }

    #[must_use]
    pub const fn search(&self) -> &SearchBar {
        &self.search
    }

    #[must_use]
    pub const fn details(&self) -> &DetailsPane {
        &self.details
    }

    #[must_use]
    pub const fn status(&self) -> &StatusNotice {
        &self.status
    }

    #[must_use]
    pub const fn layout(&self) -> PaneLayout {
        self.layout
    }

    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub const fn show_help(&self) -> bool {
        self.show_help
    }

    /// A scan has been issued that has not been applied yet.
    #[must_use]
    pub const fn scanning(&self) -> bool {
        self.issued_generation > self.applied_generation
    }

    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyBindings;
    use crate::error::CqlTuiError;
    use crate::metadata::{Category, DetailRow};
    use crate::tui::details::DetailsState;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn controller() -> Controller {
        let keymap = Keymap::from_bindings(&KeyBindings::default()).unwrap();
        let mut c = Controller::new("shop".into(), vec!["127.0.0.1:9042".into()], keymap, true);
        c.handle_event(Event::Resize(100, 30));
        c
    }

    fn entry(parents: &[&str], label: &str) -> ScanEntry {
        ScanEntry {
            parents: parents.iter().map(|s| (*s).to_string()).collect(),
            label: label.to_string(),
        }
    }

    fn scanned() -> Controller {
        let mut c = controller();
        c.init(None);
        let entries = vec![
            entry(&[], "Tables"),
            entry(&["Tables"], "orders"),
            entry(&["Tables"], "users_by_email"),
            entry(&[], "Views"),
            entry(&["Views"], "recent_orders"),
        ];
        c.handle_event(Event::ScanFinished {
            generation: 1,
            result: Ok(entries),
        });
        c
    }

    fn press(c: &mut Controller, code: KeyCode) -> Vec<Task> {
        c.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn test_layout_split() {
        assert_eq!(
            PaneLayout::compute(100, 30),
            PaneLayout {
                pane_width: 48,
                pane_height: 23
            }
        );
        assert_eq!(PaneLayout::compute(3, 2), PaneLayout::default());
    }

    #[test]
    fn test_init_issues_first_scan() {
        let mut c = controller();
        let tasks = c.init(Some(KeyspaceMetadata::default()));
        assert!(matches!(
            tasks.as_slice(),
            [Task::Scan { generation: 1, snapshot: Some(_) }]
        ));
        assert!(c.scanning());
    }

    #[test]
    fn test_enter_expands_category() {
        let mut c = scanned();
        assert_eq!(c.list().rows().len(), 2);

        assert!(press(&mut c, KeyCode::Enter).is_empty());
        assert_eq!(c.list().rows().len(), 4);
        assert_eq!(c.list().cursor(), Some(0));
    }

    #[test]
    fn test_enter_on_leaf_fetches_details() {
        let mut c = scanned();
        press(&mut c, KeyCode::Enter);
        press(&mut c, KeyCode::Down);

        let tasks = press(&mut c, KeyCode::Enter);
        let [Task::FetchDetails { tag, entity }] = tasks.as_slice() else {
            panic!("expected a details fetch, got {tasks:?}");
        };
        assert_eq!(entity, &EntityPath::new(Category::Tables, "orders"));

        c.handle_event(Event::DetailsFetched {
            tag: *tag,
            result: Ok(vec![DetailRow::new("id", "1")]),
        });
        assert!(matches!(c.details().state(), DetailsState::Loaded { .. }));
    }

    #[test]
    fn test_navigating_away_discards_details() {
        let mut c = scanned();
        press(&mut c, KeyCode::Enter);
        press(&mut c, KeyCode::Down);
        let tasks = press(&mut c, KeyCode::Enter);
        let [Task::FetchDetails { tag, .. }] = tasks.as_slice() else {
            panic!("expected a details fetch");
        };

        press(&mut c, KeyCode::Down);
        assert_eq!(c.details().state(), &DetailsState::Empty);

        c.handle_event(Event::DetailsFetched {
            tag: *tag,
            result: Ok(vec![DetailRow::new("id", "1")]),
        });
        assert_eq!(c.details().state(), &DetailsState::Empty);
    }

    #[test]
    fn test_search_submit_rebuilds_with_filter() {
        let mut c = scanned();
        press(&mut c, KeyCode::Char('/'));
        assert_eq!(c.mode(), Mode::Searching);
        for ch in "user".chars() {
            press(&mut c, KeyCode::Char(ch));
        }
        // Typing does not touch the committed filter
        assert_eq!(c.filter(), "");
        press(&mut c, KeyCode::Enter);

        assert_eq!(c.mode(), Mode::Normal);
        assert_eq!(c.filter(), "user");
        let labels: Vec<_> = c.list().rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Tables", "users_by_email"]);
        assert_eq!(c.list().cursor(), Some(0));
    }

    #[test]
    fn test_quit_key_ignored_while_searching() {
        let mut c = scanned();
        press(&mut c, KeyCode::Char('/'));
        press(&mut c, KeyCode::Char('q'));
        assert!(!c.should_quit());
        assert_eq!(c.search().query(), "q");

        press(&mut c, KeyCode::Esc);
        press(&mut c, KeyCode::Char('q'));
        assert!(c.should_quit());
    }

    #[test]
    fn test_rescan_keeps_filter_and_reports_failure() {
        let mut c = scanned();
        c.handle_event(Event::FilterChanged("orders".into()));

        let tasks = press(&mut c, KeyCode::Char('r'));
        assert!(matches!(
            tasks.as_slice(),
            [Task::Scan { generation: 2, snapshot: None }]
        ));

        c.handle_event(Event::ScanFinished {
            generation: 2,
            result: Err(CqlTuiError::metadata("shop", "timeout")),
        });
        let (_, message) = c.status().current().unwrap();
        assert!(message.starts_with("Rescan failed"));
        assert_eq!(c.filter(), "orders");
        assert!(!c.list().rows().is_empty());
        assert!(!c.should_quit());
    }

    #[test]
    fn test_rescan_keeps_branch_collapsed_under_filter() {
        let mut c = scanned();
        c.handle_event(Event::FilterChanged("o".into()));
        let labels = |c: &Controller| -> Vec<String> {
            c.list().rows().iter().map(|r| r.label.clone()).collect()
        };
        assert_eq!(labels(&c), vec!["Tables", "orders", "Views", "recent_orders"]);

        press(&mut c, KeyCode::Enter);
        assert_eq!(labels(&c), vec!["Tables", "Views", "recent_orders"]);

        press(&mut c, KeyCode::Char('r'));
        c.handle_event(Event::ScanFinished {
            generation: 2,
            result: Ok(vec![
                entry(&[], "Tables"),
                entry(&["Tables"], "orders"),
                entry(&["Tables"], "users_by_email"),
                entry(&[], "Views"),
                entry(&["Views"], "recent_orders"),
            ]),
        });
        assert_eq!(labels(&c), vec!["Tables", "Views", "recent_orders"]);

        // A new filter expands all matches again
        c.handle_event(Event::FilterChanged("or".into()));
        assert_eq!(labels(&c), vec!["Tables", "orders", "Views", "recent_orders"]);
    }

    #[test]
    fn test_stale_scan_dropped() {
        let mut c = scanned();
        press(&mut c, KeyCode::Char('r'));
        c.handle_event(Event::ScanFinished {
            generation: 2,
            result: Ok(vec![entry(&[], "Functions"), entry(&["Functions"], "f")]),
        });
        c.handle_event(Event::ScanFinished {
            generation: 1,
            result: Ok(Vec::new()),
        });
        assert_eq!(c.list().rows()[0].label, "Functions");
    }

    #[test]
    fn test_help_toggle() {
        let mut c = scanned();
        press(&mut c, KeyCode::Char('?'));
        assert!(c.show_help());
        press(&mut c, KeyCode::Char('?'));
        assert!(!c.show_help());
    }

    #[test]
    fn test_empty_category_shows_notice() {
        let mut c = scanned();
        c.handle_event(Event::FilterChanged("views".into()));
        assert_eq!(c.list().rows().len(), 1);
        assert!(press(&mut c, KeyCode::Enter).is_empty());
        assert!(c.status().current().is_some());
    }
}
