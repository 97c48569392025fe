//! Live session runner.
//!
//! A [`SessionRunner`] composes the [`SessionClock`], the [`EventLog`] and the
//! [`Initiative`] tracker behind an explicit phase machine:
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --pause--> Running --end--> Ended
//! ```
//!
//! Events and turn changes are accepted in every phase. Ending a session folds
//! the log into a [`SessionWrapUp`] and writes it through a [`SessionStore`]
//! exactly once. Everything else stays in memory and is dropped with the
//! runner.

pub mod clock;
pub mod events;
pub mod initiative;
pub mod live;
pub mod report;
pub mod ticker;

pub use clock::{ClockState, SessionClock};
pub use events::{EventKind, EventLog, Metadata, NewEvent, SessionEvent};
pub use initiative::{Initiative, InitiativeEntry};
pub use live::LiveSession;
pub use ticker::Ticker;

use serde::Serialize;

use crate::db::SessionStore;
use crate::dice::{DiceRoller, Die};
use crate::types::{Npc, Session, SessionStatus, SessionUpdate};

/// Where the runner is in a session's life
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerPhase {
    /// Opened but not started
    #[default]
    Idle,
    Running,
    Paused,
    /// Terminal; a runner cannot be restarted
    Ended,
}

impl RunnerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerPhase::Idle => "idle",
            RunnerPhase::Running => "running",
            RunnerPhase::Paused => "paused",
            RunnerPhase::Ended => "ended",
        }
    }
}

impl std::fmt::Display for RunnerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Panel selected in the run view. Display state only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerTab {
    #[default]
    Notes,
    Npcs,
    Combat,
    Locations,
    Actions,
}

impl RunnerTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerTab::Notes => "notes",
            RunnerTab::Npcs => "npcs",
            RunnerTab::Combat => "combat",
            RunnerTab::Locations => "locations",
            RunnerTab::Actions => "actions",
        }
    }
}

impl std::str::FromStr for RunnerTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" => Ok(RunnerTab::Notes),
            "npcs" => Ok(RunnerTab::Npcs),
            "combat" => Ok(RunnerTab::Combat),
            "locations" => Ok(RunnerTab::Locations),
            "actions" => Ok(RunnerTab::Actions),
            _ => Err(format!("unknown tab: {}", s)),
        }
    }
}

/// One-click canned events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    StartCombat,
    RoleplayScene,
    NewLocation,
    ImportantEvent,
    ObjectiveComplete,
}

impl QuickAction {
    pub const ALL: [QuickAction; 5] = [
        QuickAction::StartCombat,
        QuickAction::RoleplayScene,
        QuickAction::NewLocation,
        QuickAction::ImportantEvent,
        QuickAction::ObjectiveComplete,
    ];

    pub fn kind(&self) -> EventKind {
        match self {
            QuickAction::StartCombat => EventKind::Combat,
            QuickAction::RoleplayScene => EventKind::Roleplay,
            QuickAction::NewLocation => EventKind::LocationChange,
            QuickAction::ImportantEvent | QuickAction::ObjectiveComplete => EventKind::Event,
        }
    }

    pub fn content(&self) -> &'static str {
        match self {
            QuickAction::StartCombat => "Combat encounter started",
            QuickAction::RoleplayScene => "Roleplay scene begins",
            QuickAction::NewLocation => "Discovered new location",
            QuickAction::ImportantEvent => "Something important happened",
            QuickAction::ObjectiveComplete => "Objective completed",
        }
    }

    /// Short name used on the command line
    pub fn keyword(&self) -> &'static str {
        match self {
            QuickAction::StartCombat => "combat",
            QuickAction::RoleplayScene => "roleplay",
            QuickAction::NewLocation => "location",
            QuickAction::ImportantEvent => "event",
            QuickAction::ObjectiveComplete => "objective",
        }
    }
}

impl std::str::FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuickAction::ALL
            .into_iter()
            .find(|a| a.keyword() == s)
            .ok_or_else(|| format!("unknown quick action: {}", s))
    }
}

/// An action the runner declined. State is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("combatant name is empty")]
    EmptyName,

    #[error("initiative score is not an integer: {0:?}")]
    InvalidScore(String),

    #[error("no combatant with id {0}")]
    UnknownCombatant(String),

    #[error("cannot {action} a session that is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: RunnerPhase,
    },

    #[error("session has not ended")]
    NotEnded,
}

/// What ending a session produces for the session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionWrapUp {
    /// Whole minutes played, rounded down
    pub duration_minutes: u32,
    /// Note events joined by newlines
    pub summary: String,
    /// The generated report on its own
    pub report: String,
    /// Existing session notes with the report appended
    pub notes: String,
}

impl SessionWrapUp {
    pub fn as_update(&self) -> SessionUpdate {
        SessionUpdate {
            status: SessionStatus::Completed,
            duration_minutes: self.duration_minutes,
            summary: self.summary.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// In-memory state for one running session
#[derive(Debug)]
pub struct SessionRunner {
    session: Option<Session>,
    phase: RunnerPhase,
    clock: SessionClock,
    log: EventLog,
    initiative: Initiative,
    location: String,
    active_tab: RunnerTab,
    wrap_up: Option<SessionWrapUp>,
    written_back: bool,
}

impl SessionRunner {
    /// Open a session record for running
    pub fn new(session: Session) -> Self {
        Self::build(Some(session))
    }

    /// A runner with no session record. Ending it skips the write-back.
    pub fn detached() -> Self {
        Self::build(None)
    }

    fn build(session: Option<Session>) -> Self {
        Self {
            session,
            phase: RunnerPhase::Idle,
            clock: SessionClock::new(),
            log: EventLog::new(),
            initiative: Initiative::new(),
            location: String::new(),
            active_tab: RunnerTab::default(),
            wrap_up: None,
            written_back: false,
        }
    }

    /// Set the starting location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    // ============================================
    // State
    // ============================================

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn initiative(&self) -> &Initiative {
        &self.initiative
    }

    /// Mutable access for combatant details (hp, conditions)
    pub fn initiative_mut(&mut self) -> &mut Initiative {
        &mut self.initiative
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn active_tab(&self) -> RunnerTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: RunnerTab) {
        self.active_tab = tab;
    }

    /// Set once the session has ended
    pub fn wrap_up(&self) -> Option<&SessionWrapUp> {
        self.wrap_up.as_ref()
    }

    /// Whether the wrap-up reached the store
    pub fn is_written_back(&self) -> bool {
        self.written_back
    }

    fn session_id(&self) -> &str {
        self.session.as_ref().map(|s| s.id.as_str()).unwrap_or("-")
    }

    // ============================================
    // Lifecycle
    // ============================================

    /// Idle -> Running
    pub fn start(&mut self) -> Result<&SessionEvent, Rejected> {
        if self.phase != RunnerPhase::Idle {
            return Err(Rejected::InvalidTransition {
                action: "start",
                phase: self.phase,
            });
        }

        self.clock.start();
        self.phase = RunnerPhase::Running;
        tracing::info!(session_id = %self.session_id(), "Session started");
        Ok(self.record(EventKind::Event, "Session started"))
    }

    /// Running -> Paused, or Paused -> Running
    pub fn toggle_pause(&mut self) -> Result<&SessionEvent, Rejected> {
        let content = match self.phase {
            RunnerPhase::Running => {
                self.clock.pause();
                self.phase = RunnerPhase::Paused;
                "Session paused"
            }
            RunnerPhase::Paused => {
                self.clock.resume();
                self.phase = RunnerPhase::Running;
                "Session resumed"
            }
            phase => {
                return Err(Rejected::InvalidTransition {
                    action: "pause",
                    phase,
                })
            }
        };

        tracing::debug!(
            session_id = %self.session_id(),
            elapsed = self.clock.elapsed_seconds(),
            phase = %self.phase,
            "Pause toggled"
        );
        Ok(self.record(EventKind::Event, content))
    }

    /// One second of play. Returns whether the clock moved.
    pub fn tick(&mut self) -> bool {
        self.clock.tick()
    }

    /// Running/Paused -> Ended, then write the wrap-up back.
    ///
    /// The wrap-up is computed and kept even if the store fails; the error is
    /// returned and [`SessionRunner::retry_write_back`] can try again.
    pub fn end_session(&mut self, store: &dyn SessionStore) -> crate::Result<SessionWrapUp> {
        if !matches!(self.phase, RunnerPhase::Running | RunnerPhase::Paused) {
            return Err(Rejected::InvalidTransition {
                action: "end",
                phase: self.phase,
            }
            .into());
        }

        self.clock.stop();
        self.phase = RunnerPhase::Ended;

        // The report covers the log as played; the end marker comes after it.
        let elapsed = self.clock.elapsed_seconds();
        let report = report::session_report(&self.log, elapsed);
        let existing_notes = self.session.as_ref().map(|s| s.notes.as_str()).unwrap_or("");
        let wrap_up = SessionWrapUp {
            duration_minutes: u32::try_from(elapsed / 60).unwrap_or(u32::MAX),
            summary: report::note_summary(&self.log),
            notes: report::append_notes(existing_notes, &report),
            report,
        };

        self.record(EventKind::Event, "Session ended");
        self.initiative.clear();

        tracing::info!(
            session_id = %self.session_id(),
            elapsed,
            events = self.log.len(),
            "Session ended"
        );

        self.wrap_up = Some(wrap_up.clone());
        self.write_back(store)?;
        Ok(wrap_up)
    }

    /// Repeat a write-back that failed. A no-op once it has succeeded.
    pub fn retry_write_back(&mut self, store: &dyn SessionStore) -> crate::Result<()> {
        if self.phase != RunnerPhase::Ended {
            return Err(Rejected::NotEnded.into());
        }
        self.write_back(store)
    }

    fn write_back(&mut self, store: &dyn SessionStore) -> crate::Result<()> {
        if self.written_back {
            return Ok(());
        }
        let update = match &self.wrap_up {
            Some(wrap_up) => wrap_up.as_update(),
            None => return Err(Rejected::NotEnded.into()),
        };
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Detached runner, skipping write-back");
            return Ok(());
        };

        if let Err(e) = store.update_session(&session.id, &update) {
            tracing::error!(session_id = %session.id, error = %e, "Failed to write session back");
            return Err(e);
        }

        session.apply(&update);
        self.written_back = true;
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    /// Append an event stamped with the current elapsed time
    pub fn add_event(&mut self, draft: NewEvent) -> &SessionEvent {
        let event = self
            .log
            .append(draft, self.clock.elapsed_seconds(), &self.location);
        tracing::debug!(id = event.id, kind = %event.kind, ts = event.timestamp_seconds, "Event added");
        event
    }

    pub fn record(&mut self, kind: EventKind, content: impl Into<String>) -> &SessionEvent {
        self.add_event(NewEvent::new(kind, content))
    }

    /// Change the current location without logging it
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Change the current location and log the move
    pub fn travel_to(&mut self, location: impl Into<String>) -> &SessionEvent {
        let location = location.into();
        self.location.clone_from(&location);
        self.add_event(
            NewEvent::new(EventKind::LocationChange, format!("Moved to {}", location)).at(location),
        )
    }

    pub fn interact_with(&mut self, npc: &Npc) -> &SessionEvent {
        self.add_event(
            NewEvent::new(EventKind::Roleplay, format!("Interacted with {}", npc.name))
                .with_npcs([npc.id.as_str()]),
        )
    }

    pub fn quick_action(&mut self, action: QuickAction) -> &SessionEvent {
        self.record(action.kind(), action.content())
    }

    /// Roll a die and log the result
    pub fn roll(&mut self, die: Die, roller: &mut DiceRoller) -> (u32, &SessionEvent) {
        let result = roller.roll(die);
        let event = self.add_event(
            NewEvent::new(EventKind::Event, format!("Rolled {}: {}", die, result))
                .with_metadata("diceType", die.to_string())
                .with_metadata("result", result),
        );
        (result, event)
    }

    // ============================================
    // Initiative
    // ============================================

    pub fn add_combatant(
        &mut self,
        name: &str,
        initiative: i32,
        is_player_character: bool,
    ) -> Result<&InitiativeEntry, Rejected> {
        self.initiative.add(name, initiative, is_player_character)
    }

    /// Add a combatant from unvalidated text input
    pub fn add_combatant_from_input(
        &mut self,
        name: &str,
        initiative: &str,
        is_player_character: bool,
    ) -> Result<&InitiativeEntry, Rejected> {
        self.initiative
            .add_from_input(name, initiative, is_player_character)
    }

    pub fn remove_combatant(&mut self, id: &str) -> Result<InitiativeEntry, Rejected> {
        self.initiative.remove(id)
    }

    /// Pass the turn and log whose it is. `None` when nobody is in initiative.
    pub fn advance_turn(&mut self) -> Option<&SessionEvent> {
        let name = self.initiative.advance()?.name.clone();
        let turn = self.initiative.current_index();
        Some(self.add_event(
            NewEvent::new(EventKind::Event, format!("Turn: {}", name)).with_metadata("turn", turn),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};

    /// Records updates; fails while `fail` is set
    #[derive(Default)]
    struct RecordingStore {
        updates: RefCell<Vec<(String, SessionUpdate)>>,
        fail: Cell<bool>,
    }

    impl SessionStore for RecordingStore {
        fn update_session(&self, id: &str, update: &SessionUpdate) -> crate::Result<()> {
            if self.fail.get() {
                return Err(Error::SessionNotFound(id.to_string()));
            }
            self.updates
                .borrow_mut()
                .push((id.to_string(), update.clone()));
            Ok(())
        }
    }

    fn session() -> Session {
        let mut session = Session::new(
            "campaign-1",
            "The Sunken Keep",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        );
        session.id = "session-1".to_string();
        session
    }

    fn contents(runner: &SessionRunner) -> Vec<&str> {
        runner.log().events().iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_lifecycle_events() {
        let store = RecordingStore::default();
        let mut runner = SessionRunner::new(session());
        assert_eq!(runner.phase(), RunnerPhase::Idle);

        runner.start().unwrap();
        runner.toggle_pause().unwrap();
        assert_eq!(runner.phase(), RunnerPhase::Paused);
        assert!(runner.clock().is_paused());
        runner.toggle_pause().unwrap();
        assert_eq!(runner.phase(), RunnerPhase::Running);
        runner.end_session(&store).unwrap();

        assert_eq!(runner.phase(), RunnerPhase::Ended);
        assert_eq!(
            contents(&runner),
            vec!["Session started", "Session paused", "Session resumed", "Session ended"]
        );
        assert!(!runner.clock().is_running());
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let store = RecordingStore::default();
        let mut runner = SessionRunner::new(session());

        assert_eq!(
            runner.toggle_pause().unwrap_err(),
            Rejected::InvalidTransition {
                action: "pause",
                phase: RunnerPhase::Idle
            }
        );
        assert!(matches!(
            runner.end_session(&store),
            Err(Error::Rejected(Rejected::InvalidTransition { action: "end", .. }))
        ));
        assert!(runner.log().is_empty());

        runner.start().unwrap();
        assert!(runner.start().is_err());
        assert_eq!(runner.log().len(), 1);

        runner.end_session(&store).unwrap();
        assert!(runner.start().is_err());
        assert!(runner.toggle_pause().is_err());
        assert!(runner.end_session(&store).is_err());
        assert_eq!(store.updates.borrow().len(), 1);
    }

    #[test]
    fn test_events_stamped_with_elapsed_time() {
        let mut runner = SessionRunner::new(session()).with_location("Tavern");
        runner.record(EventKind::Note, "before start");
        runner.start().unwrap();
        for _ in 0..42 {
            assert!(runner.tick());
        }
        let event = runner.record(EventKind::Note, "later");
        assert_eq!(event.timestamp_seconds, 42);
        assert_eq!(event.location, "Tavern");
        assert_eq!(runner.log().events()[0].timestamp_seconds, 0);
    }

    #[test]
    fn test_ticks_ignored_while_paused() {
        let mut runner = SessionRunner::detached();
        assert!(!runner.tick());
        runner.start().unwrap();
        runner.tick();
        runner.toggle_pause().unwrap();
        assert!(!runner.tick());
        assert_eq!(runner.elapsed_seconds(), 1);
    }

    #[test]
    fn test_end_session_wrap_up() {
        let store = RecordingStore::default();
        let mut s = session();
        s.notes = "Prep: the keep floods at high tide".to_string();
        let mut runner = SessionRunner::new(s);

        runner.start().unwrap();
        runner.record(EventKind::Note, "Found a clue");
        for _ in 0..125 {
            runner.tick();
        }
        runner.record(EventKind::Combat, "Goblin ambush");
        runner.record(EventKind::Note, "Goblins carry keep sigils");
        runner.add_combatant("Goblin", 12, false).unwrap();

        let wrap_up = runner.end_session(&store).unwrap();
        assert_eq!(wrap_up.duration_minutes, 2);
        assert_eq!(wrap_up.summary, "Found a clue\nGoblins carry keep sigils");
        assert!(wrap_up
            .notes
            .starts_with("Prep: the keep floods at high tide\n\nSession Summary - 00:02:05"));
        assert!(wrap_up.report.contains("[00:02:05] Goblin ambush"));
        assert!(!wrap_up.report.contains("Session ended"));
        assert!(wrap_up.report.contains("Events: 1\nCombat Encounters: 1\nNotes: 2"));
        assert_eq!(runner.log().last().unwrap().content, "Session ended");
        assert!(runner.initiative().is_empty());

        let updates = store.updates.borrow();
        assert_eq!(updates.len(), 1);
        let (id, update) = &updates[0];
        assert_eq!(id, "session-1");
        assert_eq!(update.status, SessionStatus::Completed);
        assert_eq!(update.notes, wrap_up.notes);

        let record = runner.session().unwrap();
        assert_eq!(record.status, SessionStatus::Completed);
        assert_eq!(record.duration_minutes, 2);
        assert!(runner.is_written_back());
    }

    #[test]
    fn test_failed_write_back_can_be_retried() {
        let store = RecordingStore::default();
        store.fail.set(true);
        let mut runner = SessionRunner::new(session());
        runner.start().unwrap();

        let err = runner.end_session(&store).unwrap_err();
        assert!(matches!(err, Error::SessionNotFound(_)));
        assert_eq!(runner.phase(), RunnerPhase::Ended);
        assert!(runner.wrap_up().is_some());
        assert!(!runner.is_written_back());
        assert_eq!(runner.session().unwrap().status, SessionStatus::Planned);

        store.fail.set(false);
        runner.retry_write_back(&store).unwrap();
        runner.retry_write_back(&store).unwrap();
        assert_eq!(store.updates.borrow().len(), 1);
        assert!(runner.is_written_back());
    }

    #[test]
    fn test_retry_before_end_is_rejected() {
        let store = RecordingStore::default();
        let mut runner = SessionRunner::new(session());
        assert!(matches!(
            runner.retry_write_back(&store),
            Err(Error::Rejected(Rejected::NotEnded))
        ));
    }

    #[test]
    fn test_detached_runner_skips_write_back() {
        let store = RecordingStore::default();
        let mut runner = SessionRunner::detached();
        runner.start().unwrap();
        runner.record(EventKind::Note, "scratch");

        let wrap_up = runner.end_session(&store).unwrap();
        assert_eq!(wrap_up.summary, "scratch");
        assert!(wrap_up.notes.starts_with("Session Summary"));
        assert!(store.updates.borrow().is_empty());
        assert!(!runner.is_written_back());
    }

    #[test]
    fn test_travel_and_interaction() {
        let mut runner = SessionRunner::detached().with_location("Tavern");

        runner.set_location("Cellar");
        assert!(runner.log().is_empty());

        let event = runner.travel_to("Docks");
        assert_eq!(event.kind, EventKind::LocationChange);
        assert_eq!(event.content, "Moved to Docks");
        assert_eq!(event.location, "Docks");
        assert_eq!(runner.location(), "Docks");

        let mut npc = Npc::new("campaign-1", "Mira", "Elf");
        npc.id = "npc-7".to_string();
        let event = runner.interact_with(&npc);
        assert_eq!(event.kind, EventKind::Roleplay);
        assert_eq!(event.content, "Interacted with Mira");
        assert_eq!(event.npc_refs, vec!["npc-7"]);
        assert_eq!(event.location, "Docks");
    }

    #[test]
    fn test_quick_actions() {
        let mut runner = SessionRunner::detached();
        for action in QuickAction::ALL {
            runner.quick_action(action);
        }
        let kinds: Vec<_> = runner.log().events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Combat,
                EventKind::Roleplay,
                EventKind::LocationChange,
                EventKind::Event,
                EventKind::Event
            ]
        );
        assert_eq!(runner.log().events()[4].content, "Objective completed");
        assert_eq!("objective".parse(), Ok(QuickAction::ObjectiveComplete));
        assert!("dance".parse::<QuickAction>().is_err());
    }

    #[test]
    fn test_roll_logs_result() {
        let mut runner = SessionRunner::detached();
        let mut roller = DiceRoller::seeded(3);
        let (result, event) = runner.roll(Die::D20, &mut roller);
        assert!((1..=20).contains(&result));
        assert_eq!(event.kind, EventKind::Event);
        assert_eq!(event.content, format!("Rolled d20: {}", result));
        assert_eq!(event.metadata["diceType"], "d20");
        assert_eq!(event.metadata["result"], result);
        assert_eq!(runner.log().len(), 1);
    }

    #[test]
    fn test_advance_turn_logs_turn() {
        let mut runner = SessionRunner::detached().with_location("Bridge");
        assert!(runner.advance_turn().is_none());
        assert!(runner.log().is_empty());

        runner.add_combatant("Aria", 18, true).unwrap();
        runner.add_combatant("Goblin", 12, false).unwrap();

        let event = runner.advance_turn().unwrap();
        assert_eq!(event.content, "Turn: Goblin");
        assert_eq!(event.metadata["turn"], 1);
        assert_eq!(event.location, "Bridge");

        let event = runner.advance_turn().unwrap();
        assert_eq!(event.content, "Turn: Aria");
        assert_eq!(event.metadata["turn"], 0);
    }

    #[test]
    fn test_combatant_rejections_leave_state_alone() {
        let mut runner = SessionRunner::detached();
        assert_eq!(
            runner.add_combatant_from_input("", "10", false).unwrap_err(),
            Rejected::EmptyName
        );
        assert!(matches!(
            runner.add_combatant_from_input("Orc", "ten", false),
            Err(Rejected::InvalidScore(_))
        ));
        assert!(runner.remove_combatant("missing").is_err());
        assert!(runner.initiative().is_empty());
        assert!(runner.log().is_empty());
    }

    #[test]
    fn test_active_tab() {
        let mut runner = SessionRunner::detached();
        assert_eq!(runner.active_tab(), RunnerTab::Notes);
        runner.set_active_tab("combat".parse().unwrap());
        assert_eq!(runner.active_tab(), RunnerTab::Combat);
        assert!(runner.log().is_empty());
    }
}
