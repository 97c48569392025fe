//! Append-only session event log.
//!
//! Every event is stamped with elapsed session time, not wall-clock time.
//! The log only grows: there is no edit or delete, and the canonical order is
//! creation order.

use serde::{Deserialize, Serialize};

/// Open key/value payload attached to an event (dice results, turn index)
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// What kind of moment an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Note,
    Combat,
    Roleplay,
    /// Generic event: lifecycle markers, dice rolls, turn changes
    Event,
    LocationChange,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Note,
        EventKind::Combat,
        EventKind::Roleplay,
        EventKind::Event,
        EventKind::LocationChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Note => "note",
            EventKind::Combat => "combat",
            EventKind::Roleplay => "roleplay",
            EventKind::Event => "event",
            EventKind::LocationChange => "location-change",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(EventKind::Note),
            "combat" => Ok(EventKind::Combat),
            "roleplay" => Ok(EventKind::Roleplay),
            "event" => Ok(EventKind::Event),
            "location-change" => Ok(EventKind::LocationChange),
            _ => Err(format!("unknown event kind: {}", s)),
        }
    }
}

/// A recorded moment of play
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    /// Sequence number, unique within one log
    pub id: u64,
    /// Elapsed session seconds when the event was created
    pub timestamp_seconds: u64,
    pub kind: EventKind,
    pub content: String,
    /// IDs of the NPCs involved, in the order given
    pub npc_refs: Vec<String>,
    /// Where the party was when this happened
    pub location: String,
    pub metadata: Metadata,
}

/// An event that has not been stamped yet
#[derive(Debug, Clone)]
pub struct NewEvent {
    kind: EventKind,
    content: String,
    npc_refs: Vec<String>,
    location: Option<String>,
    metadata: Metadata,
}

impl NewEvent {
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            npc_refs: Vec::new(),
            location: None,
            metadata: Metadata::new(),
        }
    }

    /// Reference NPCs by ID
    pub fn with_npcs<I, S>(mut self, npc_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.npc_refs.extend(npc_ids.into_iter().map(Into::into));
        self
    }

    /// Override the runner's current location for this event
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Ordered, append-only sequence of session events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SessionEvent>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and append an event.
    ///
    /// An absent or empty location falls back to `current_location`.
    pub fn append(
        &mut self,
        draft: NewEvent,
        timestamp_seconds: u64,
        current_location: &str,
    ) -> &SessionEvent {
        let location = draft
            .location
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| current_location.to_string());

        self.next_id += 1;
        self.events.push(SessionEvent {
            id: self.next_id,
            timestamp_seconds,
            kind: draft.kind,
            content: draft.content,
            npc_refs: draft.npc_refs,
            location,
            metadata: draft.metadata,
        });

        &self.events[self.events.len() - 1]
    }

    /// Events in creation order
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&SessionEvent> {
        self.events.last()
    }

    /// Newest first, for timeline views.
    ///
    /// Timestamps never decrease along the log, so reversing creation order
    /// is a stable descending sort by timestamp.
    pub fn recent_first(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter().rev()
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Number of events of each kind present in the log, in `EventKind::ALL` order
    pub fn counts(&self) -> Vec<(EventKind, usize)> {
        EventKind::ALL
            .iter()
            .map(|&kind| (kind, self.count(kind)))
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    /// Timeline lookup, newest first.
    ///
    /// `kind` narrows to one event kind. `text` matches case-insensitively
    /// against the content, the location or any NPC reference; an empty
    /// term matches everything.
    pub fn search(&self, kind: Option<EventKind>, text: &str) -> Vec<&SessionEvent> {
        let needle = text.trim().to_lowercase();
        self.recent_first()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .filter(|e| needle.is_empty() || e.matches_text(&needle))
            .collect()
    }
}

impl SessionEvent {
    /// `needle` must already be lowercase
    fn matches_text(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
            || self
                .npc_refs
                .iter()
                .any(|npc| npc.to_lowercase().contains(needle))
    }
}
