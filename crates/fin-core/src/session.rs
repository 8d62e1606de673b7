//! The session controller.
//!
//! [`Session`] owns the query, the result list, the selection and the query
//! history, and is the only place they change. Keyboard input is applied
//! synchronously; provider I/O runs on the poll task and comes back as
//! batches through [`PollLoop::next_batch`]. Every observable change goes out
//! to the window collaborator as a [`UiUpdate`].

use std::sync::Arc;
use std::time::Duration;

use fin_types::{Geometry, ResultSet, SearchResult, UiUpdate};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::{Config, WindowConfig};
use crate::dispatch::{ActionDispatcher, Shell};
use crate::geometry::geometry_for;
use crate::history::HistoryRing;
use crate::keymap::{KeyAction, KeyChord, Keymap};
use crate::merge::merge;
use crate::poll::PollLoop;
use crate::provider::ResultProvider;
use crate::selection::{Selection, Step};

/// Which page the window shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Search,
    Settings,
}

/// Derived interaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Empty query, no results, no selection
    Idle,
    /// Non-empty query, nothing selected
    Editing,
    /// Non-empty query, a row selected
    Browsing,
}

/// Everything the session owns
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) query: String,
    pub(crate) results: ResultSet,
    pub(crate) selection: Selection,
    pub(crate) history: HistoryRing,
    pub(crate) page: Page,
}

impl SessionState {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selection.index()
    }

    #[must_use]
    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.query.is_empty(), self.selection.is_active()) {
            (true, _) => Phase::Idle,
            (false, false) => Phase::Editing,
            (false, true) => Phase::Browsing,
        }
    }
}

/// Input events a front end feeds into [`Session::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The user edited the query field
    QueryChanged(String),
    /// A logical key action
    Key(KeyAction),
    /// A raw chord, resolved through the keymap
    Chord(KeyChord),
    /// A result row was clicked
    Select(usize),
    /// The window lost focus
    FocusLost,
}

pub struct Session<P, S> {
    state: SessionState,
    provider: Arc<P>,
    dispatcher: ActionDispatcher<S>,
    poll: PollLoop,
    poll_interval: Duration,
    window: WindowConfig,
    keymap: Keymap,
    geometry: Option<Geometry>,
    updates: mpsc::UnboundedSender<UiUpdate>,
}

impl<P: ResultProvider, S: Shell> Session<P, S> {
    /// Create a session and the channel its updates arrive on.
    ///
    /// The initial collapsed geometry is the first update sent.
    pub fn new(
        provider: Arc<P>,
        shell: Arc<S>,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<UiUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let mut session = Self {
            state: SessionState::default(),
            provider,
            dispatcher: ActionDispatcher::new(shell),
            poll: PollLoop::new(),
            poll_interval: config.poll.interval(),
            window: config.window.clone(),
            keymap: Keymap::from_config(&config.keymap),
            geometry: None,
            updates,
        };
        session.refresh_geometry();
        (session, rx)
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll.is_running()
    }

    /// Drive the session until `events` closes, then wait for dispatched
    /// actions to finish.
    pub async fn run(&mut self, mut events: mpsc::Receiver<SessionEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                batch = self.poll.next_batch() => self.apply_batch(batch),
            }
        }
        self.poll.stop();
        debug!("Session input closed, {} actions in flight", self.dispatcher.in_flight());
        self.dispatcher.wait_idle().await;
    }

    /// Wait for the next poll batch and apply it.
    ///
    /// Pends forever while no query is active.
    pub async fn poll_once(&mut self) {
        let batch = self.poll.next_batch().await;
        self.apply_batch(batch);
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::QueryChanged(query) => self.set_query(query),
            SessionEvent::Key(action) => self.handle_key(action),
            SessionEvent::Chord(chord) => {
                self.handle_chord(&chord);
            }
            SessionEvent::Select(index) => self.select_index(index),
            SessionEvent::FocusLost => self.focus_lost(),
        }
    }

    /// Typed edit of the query field.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.history.reset();
        self.apply_query(query.into(), false);
    }

    /// Resolve `chord` through the keymap. Returns whether it was bound.
    pub fn handle_chord(&mut self, chord: &KeyChord) -> bool {
        match self.keymap.resolve(chord) {
            Some(action) => {
                self.handle_key(action);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, action: KeyAction) {
        debug!("Key action {action} in {:?}", self.state.phase());
        match action {
            KeyAction::Clear => self.clear(),
            KeyAction::Next => {
                let step = self.state.selection.move_next(self.state.results.len());
                self.on_step(step);
            }
            KeyAction::Previous => {
                let step = self
                    .state
                    .selection
                    .move_previous(self.state.results.len());
                self.on_step(step);
            }
            KeyAction::HistoryBack => {
                if let Some(query) = self.state.history.cycle_backward().map(str::to_owned) {
                    self.apply_query(query, true);
                }
            }
            KeyAction::HistoryForward => {
                if let Some(query) = self.state.history.cycle_forward().map(str::to_owned) {
                    self.apply_query(query, true);
                }
            }
            KeyAction::Activate => self.activate(),
            KeyAction::OpenSettings => self.open_settings(),
        }
    }

    /// Pointer selection of row `index`.
    pub fn select_index(&mut self, index: usize) {
        let step = self
            .state
            .selection
            .select(index, self.state.results.len());
        self.on_step(step);
    }

    pub fn focus_lost(&mut self) {
        self.emit(UiUpdate::Hide);
    }

    /// Accept a batch from the poll loop.
    pub fn apply_batch(&mut self, batch: Vec<SearchResult>) {
        if self.state.query.is_empty() {
            debug!("Discarding {} results for empty query", batch.len());
            return;
        }

        let Some(results) = merge(&self.state.results, batch) else {
            return;
        };

        debug!("Showing {} results for {:?}", results.len(), self.state.query);
        self.state.results = results;
        self.reset_selection();
        self.emit(UiUpdate::Results {
            results: self.state.results.clone(),
        });
        self.refresh_geometry();
    }

    fn clear(&mut self) {
        if self.state.query.is_empty() {
            self.emit(UiUpdate::Hide);
            return;
        }
        self.state.history.reset();
        self.apply_query(String::new(), true);
    }

    fn activate(&mut self) {
        let Some(index) = self.state.selection.index() else {
            return;
        };
        if let Some(result) = self.state.results.get(index) {
            self.dispatcher.dispatch(result);
        }
        self.reset_selection();
    }

    fn open_settings(&mut self) {
        self.state.page = Page::Settings;
        self.emit(UiUpdate::OpenSettings);
        self.refresh_geometry();
    }

    /// Replace the query. `echo` sends it back to the window for changes
    /// the user did not type.
    fn apply_query(&mut self, query: String, echo: bool) {
        if query == self.state.query {
            return;
        }

        self.state.query = query;
        self.state.page = Page::Search;
        self.reset_selection();
        if echo {
            self.emit(UiUpdate::Query {
                query: self.state.query.clone(),
            });
        }

        if self.state.query.is_empty() {
            self.poll.stop();
            if !self.state.results.is_empty() {
                self.state.results = ResultSet::empty();
                self.emit(UiUpdate::Results {
                    results: ResultSet::empty(),
                });
            }
        } else {
            self.poll.start(
                Arc::clone(&self.provider),
                self.state.query.clone(),
                self.poll_interval,
            );
        }
        self.refresh_geometry();
    }

    fn on_step(&mut self, step: Option<Step>) {
        match step {
            None => {}
            Some(Step::Entered(index)) => {
                self.state.history.append(self.state.query.clone());
                self.emit(UiUpdate::FocusRow { index });
            }
            Some(Step::Moved(index)) => self.emit(UiUpdate::FocusRow { index }),
        }
    }

    fn reset_selection(&mut self) {
        if self.state.selection.clear() {
            self.emit(UiUpdate::FocusInput);
        }
    }

    fn refresh_geometry(&mut self) {
        let geometry = geometry_for(&self.state, &self.window);
        if self.geometry != Some(geometry) {
            self.geometry = Some(geometry);
            self.emit(UiUpdate::Resize { geometry });
        }
    }

    fn emit(&self, update: UiUpdate) {
        if self.updates.send(update).is_err() {
            debug!("UI update dropped, receiver closed");
        }
    }
}
