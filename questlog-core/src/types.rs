//! Core domain types for questlog
//!
//! These types are the durable campaign-planning records. The live session
//! runner reads them and writes exactly one [`SessionUpdate`] back when a
//! session ends.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Campaign** | Top-level container grouping sessions, NPCs and locations |
//! | **Session** | One tabletop game sitting, planned ahead and later run live |
//! | **NPC** | A non-player character the game master voices |
//! | **Location** | A place in the campaign world the party can travel to |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Generate a fresh record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================
// Campaign
// ============================================

/// A campaign groups every other record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier
    pub id: String,
    /// Campaign title
    pub title: String,
    /// Short pitch
    pub description: String,
    /// Name of the setting
    pub world_name: String,
    /// Free-form status label ("active", "on hold", ...)
    pub status: String,
    /// Running notes kept by the game master
    pub notes: String,
    /// When the campaign was created
    pub created_at: DateTime<Utc>,
    /// When the campaign was last modified
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a new active campaign with a generated ID
    pub fn new(title: impl Into<String>, world_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            world_name: world_name.into(),
            status: "active".to_string(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================
// Session
// ============================================

/// Lifecycle of a session record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Scheduled, not yet played
    #[default]
    Planned,
    /// Played to the end
    Completed,
    /// Called off
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(SessionStatus::Planned),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" | "canceled" => Ok(SessionStatus::Cancelled),
            _ => Err(format!("unknown session status: {}", s)),
        }
    }
}

/// The durable session record owned by the data store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: String,
    /// FK to campaigns table
    pub campaign_id: String,
    /// Session title
    pub title: String,
    /// Planning description
    pub description: String,
    /// Date the session is (or was) played
    pub date: NaiveDate,
    /// Played duration in whole minutes
    pub duration_minutes: u32,
    /// Newline-joined notes taken during play
    pub summary: String,
    /// Free-form notes; end-of-session reports are appended here
    pub notes: String,
    /// Lifecycle status
    pub status: SessionStatus,
}

impl Session {
    /// Create a new planned session with a generated ID
    pub fn new(campaign_id: impl Into<String>, title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            campaign_id: campaign_id.into(),
            title: title.into(),
            description: String::new(),
            date,
            duration_minutes: 0,
            summary: String::new(),
            notes: String::new(),
            status: SessionStatus::Planned,
        }
    }

    /// Merge an end-of-session update into this record
    pub fn apply(&mut self, update: &SessionUpdate) {
        self.status = update.status;
        self.duration_minutes = update.duration_minutes;
        self.summary.clone_from(&update.summary);
        self.notes.clone_from(&update.notes);
    }
}

/// The fields the session runner writes back when a session ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUpdate {
    pub status: SessionStatus,
    pub duration_minutes: u32,
    pub summary: String,
    pub notes: String,
}

// ============================================
// NPCs
// ============================================

/// Whether an NPC is still around
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcStatus {
    #[default]
    Alive,
    Dead,
    Missing,
    Unknown,
}

impl NpcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NpcStatus::Alive => "alive",
            NpcStatus::Dead => "dead",
            NpcStatus::Missing => "missing",
            NpcStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for NpcStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alive" => Ok(NpcStatus::Alive),
            "dead" => Ok(NpcStatus::Dead),
            "missing" => Ok(NpcStatus::Missing),
            "unknown" => Ok(NpcStatus::Unknown),
            _ => Err(format!("unknown NPC status: {}", s)),
        }
    }
}

/// A non-player character in a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub race: String,
    pub class: Option<String>,
    pub description: String,
    pub status: NpcStatus,
}

impl Npc {
    /// Create a living NPC with a generated ID
    pub fn new(campaign_id: impl Into<String>, name: impl Into<String>, race: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            campaign_id: campaign_id.into(),
            name: name.into(),
            race: race.into(),
            class: None,
            description: String::new(),
            status: NpcStatus::Alive,
        }
    }
}

// ============================================
// Locations
// ============================================

/// Kind of place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    City,
    #[default]
    Town,
    Village,
    Dungeon,
    Wilderness,
    Landmark,
    Building,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::City => "city",
            LocationKind::Town => "town",
            LocationKind::Village => "village",
            LocationKind::Dungeon => "dungeon",
            LocationKind::Wilderness => "wilderness",
            LocationKind::Landmark => "landmark",
            LocationKind::Building => "building",
        }
    }
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" => Ok(LocationKind::City),
            "town" => Ok(LocationKind::Town),
            "village" => Ok(LocationKind::Village),
            "dungeon" => Ok(LocationKind::Dungeon),
            "wilderness" => Ok(LocationKind::Wilderness),
            "landmark" => Ok(LocationKind::Landmark),
            "building" => Ok(LocationKind::Building),
            _ => Err(format!("unknown location kind: {}", s)),
        }
    }
}

/// A place in a campaign world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub kind: LocationKind,
    pub description: String,
}

impl Location {
    /// Create a location with a generated ID
    pub fn new(campaign_id: impl Into<String>, name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            id: new_id(),
            campaign_id: campaign_id.into(),
            name: name.into(),
            kind,
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_roundtrip() {
        for status in [
            SessionStatus::Planned,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<SessionStatus>(), Ok(status));
        }
        assert_eq!("canceled".parse(), Ok(SessionStatus::Cancelled));
        assert!("finished".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_session_apply_update() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut session = Session::new("campaign-1", "The Sunken Crypt", date);
        session.notes = "Prep: bring maps".to_string();

        session.apply(&SessionUpdate {
            status: SessionStatus::Completed,
            duration_minutes: 2,
            summary: "Found a clue".to_string(),
            notes: "Prep: bring maps\n\nreport".to_string(),
        });

        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.duration_minutes, 2);
        assert_eq!(session.summary, "Found a clue");
        assert!(session.notes.ends_with("report"));
        assert_eq!(session.title, "The Sunken Crypt");
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = Campaign::new("A", "World");
        let b = Campaign::new("B", "World");
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, "active");
    }

    #[test]
    fn test_location_kind_parse() {
        assert_eq!("dungeon".parse(), Ok(LocationKind::Dungeon));
        assert!("castle".parse::<LocationKind>().is_err());
    }
}
