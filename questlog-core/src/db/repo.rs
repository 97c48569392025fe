//! Database repository layer
//!
//! Provides query and insert operations for campaigns and the records a
//! session run consumes.

use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::SessionStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        super::schema::run_migrations(&self.conn())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves the connection itself usable.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ============================================
    // Campaign operations
    // ============================================

    /// Insert a new campaign
    pub fn insert_campaign(&self, campaign: &Campaign) -> Result<()> {
        if campaign.title.trim().is_empty() {
            return Err(Error::InvalidRecord("campaign title is empty".to_string()));
        }

        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO campaigns (id, title, description, world_name, status, notes,
                                   created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                campaign.id,
                campaign.title,
                campaign.description,
                campaign.world_name,
                campaign.status,
                campaign.notes,
                campaign.created_at.to_rfc3339(),
                campaign.updated_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(campaign_id = %campaign.id, title = %campaign.title, "Inserted campaign");
        Ok(())
    }

    /// Get a campaign by ID
    pub fn get_campaign(&self, id: &str) -> Result<Option<Campaign>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT * FROM campaigns WHERE id = ?",
            [id],
            Self::row_to_campaign,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all campaigns, most recently updated first
    pub fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT * FROM campaigns ORDER BY updated_at DESC, title")?;
        let campaigns = stmt
            .query_map([], Self::row_to_campaign)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(campaigns)
    }

    fn require_campaign(conn: &Connection, campaign_id: &str) -> Result<()> {
        let exists: Option<i64> = conn
            .query_row("SELECT 1 FROM campaigns WHERE id = ?", [campaign_id], |r| {
                r.get(0)
            })
            .optional()?;
        match exists {
            Some(_) => Ok(()),
            None => Err(Error::CampaignNotFound(campaign_id.to_string())),
        }
    }

    fn row_to_campaign(row: &Row) -> rusqlite::Result<Campaign> {
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Campaign {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            world_name: row.get("world_name")?,
            status: row.get("status")?,
            notes: row.get("notes")?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    // ============================================
    // Session operations
    // ============================================

    /// Insert a new session record
    pub fn insert_session(&self, session: &Session) -> Result<()> {
        if session.title.trim().is_empty() {
            return Err(Error::InvalidRecord("session title is empty".to_string()));
        }

        let conn = self.conn();
        Self::require_campaign(&conn, &session.campaign_id)?;
        conn.execute(
            r#"
            INSERT INTO sessions (id, campaign_id, title, description, date,
                                  duration_minutes, summary, notes, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                session.id,
                session.campaign_id,
                session.title,
                session.description,
                session.date.format(DATE_FORMAT).to_string(),
                session.duration_minutes,
                session.summary,
                session.notes,
                session.status.as_str(),
            ],
        )?;
        tracing::debug!(session_id = %session.id, campaign_id = %session.campaign_id, "Inserted session");
        Ok(())
    }

    /// Get a session by ID
    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row("SELECT * FROM sessions WHERE id = ?", [id], |row| {
            Self::row_to_session(row)
        })
        .optional()
        .map_err(Error::from)
    }

    /// List sessions with optional filtering, latest date first
    pub fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let conn = self.conn();

        let mut sql = String::from("SELECT * FROM sessions WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(campaign_id) = &filter.campaign_id {
            sql.push_str(" AND campaign_id = ?");
            params.push(Box::new(campaign_id.clone()));
        }

        if let Some(status) = &filter.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY date DESC, title");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let sessions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_session)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Apply an end-of-session update to a stored session
    pub fn update_session(&self, id: &str, update: &SessionUpdate) -> Result<()> {
        let conn = self.conn();
        let changed = conn.execute(
            r#"
            UPDATE sessions
            SET status = ?2, duration_minutes = ?3, summary = ?4, notes = ?5
            WHERE id = ?1
            "#,
            params![
                id,
                update.status.as_str(),
                update.duration_minutes,
                update.summary,
                update.notes,
            ],
        )?;

        if changed == 0 {
            return Err(Error::SessionNotFound(id.to_string()));
        }

        tracing::info!(
            session_id = %id,
            status = %update.status,
            duration_minutes = update.duration_minutes,
            "Updated session"
        );
        Ok(())
    }

    fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
        let date_str: String = row.get("date")?;
        let status_str: String = row.get("status")?;

        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Session {
            id: row.get("id")?,
            campaign_id: row.get("campaign_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            date,
            duration_minutes: row.get("duration_minutes")?,
            summary: row.get("summary")?,
            notes: row.get("notes")?,
            status: status_str.parse().unwrap_or_default(),
        })
    }

    // ============================================
    // NPC operations
    // ============================================

    /// Insert a new NPC
    pub fn insert_npc(&self, npc: &Npc) -> Result<()> {
        if npc.name.trim().is_empty() {
            return Err(Error::InvalidRecord("NPC name is empty".to_string()));
        }

        let conn = self.conn();
        Self::require_campaign(&conn, &npc.campaign_id)?;
        conn.execute(
            r#"
            INSERT INTO npcs (id, campaign_id, name, race, class, description, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                npc.id,
                npc.campaign_id,
                npc.name,
                npc.race,
                npc.class,
                npc.description,
                npc.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// List a campaign's NPCs by name
    pub fn list_npcs(&self, campaign_id: &str) -> Result<Vec<Npc>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT * FROM npcs WHERE campaign_id = ? ORDER BY name COLLATE NOCASE")?;
        let npcs = stmt
            .query_map([campaign_id], |row| {
                let status_str: String = row.get("status")?;
                Ok(Npc {
                    id: row.get("id")?,
                    campaign_id: row.get("campaign_id")?,
                    name: row.get("name")?,
                    race: row.get("race")?,
                    class: row.get("class")?,
                    description: row.get("description")?,
                    status: status_str.parse().unwrap_or(NpcStatus::Unknown),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(npcs)
    }

    // ============================================
    // Location operations
    // ============================================

    /// Insert a new location
    pub fn insert_location(&self, location: &Location) -> Result<()> {
        if location.name.trim().is_empty() {
            return Err(Error::InvalidRecord("location name is empty".to_string()));
        }

        let conn = self.conn();
        Self::require_campaign(&conn, &location.campaign_id)?;
        conn.execute(
            r#"
            INSERT INTO locations (id, campaign_id, name, kind, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                location.id,
                location.campaign_id,
                location.name,
                location.kind.as_str(),
                location.description,
            ],
        )?;
        Ok(())
    }

    /// List a campaign's locations by name
    pub fn list_locations(&self, campaign_id: &str) -> Result<Vec<Location>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT * FROM locations WHERE campaign_id = ? ORDER BY name COLLATE NOCASE",
        )?;
        let locations = stmt
            .query_map([campaign_id], |row| {
                let kind_str: String = row.get("kind")?;
                Ok(Location {
                    id: row.get("id")?,
                    campaign_id: row.get("campaign_id")?,
                    name: row.get("name")?,
                    kind: kind_str.parse().unwrap_or_default(),
                    description: row.get("description")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(locations)
    }
}

impl SessionStore for Database {
    fn update_session(&self, id: &str, update: &SessionUpdate) -> Result<()> {
        Database::update_session(self, id, update)
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Filter options for listing sessions
#[derive(Debug, Default, Clone)]
pub struct SessionFilter {
    pub campaign_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn seed_campaign(db: &Database) -> Campaign {
        let campaign = Campaign::new("Curse of the Tides", "Saltmarsh");
        db.insert_campaign(&campaign).unwrap();
        campaign
    }

    #[test]
    fn test_campaign_crud() {
        let db = test_db();
        let campaign = seed_campaign(&db);

        let retrieved = db.get_campaign(&campaign.id).unwrap().unwrap();
        assert_eq!(retrieved.title, "Curse of the Tides");
        assert_eq!(retrieved.world_name, "Saltmarsh");

        assert_eq!(db.list_campaigns().unwrap().len(), 1);
        assert!(db.get_campaign("missing").unwrap().is_none());
    }

    #[test]
    fn test_campaign_requires_title() {
        let db = test_db();
        let campaign = Campaign::new("   ", "Nowhere");
        assert!(matches!(
            db.insert_campaign(&campaign),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_session_crud() {
        let db = test_db();
        let campaign = seed_campaign(&db);

        let session = Session::new(&campaign.id, "Session 1: The Wreck", date(18));
        db.insert_session(&session).unwrap();

        let retrieved = db.get_session(&session.id).unwrap().unwrap();
        assert_eq!(retrieved, session);
        assert_eq!(retrieved.status, SessionStatus::Planned);
    }

    #[test]
    fn test_session_requires_campaign() {
        let db = test_db();
        let session = Session::new("no-such-campaign", "Orphan", date(1));
        assert!(matches!(
            db.insert_session(&session),
            Err(Error::CampaignNotFound(id)) if id == "no-such-campaign"
        ));
    }

    #[test]
    fn test_list_sessions_filtering() {
        let db = test_db();
        let campaign = seed_campaign(&db);
        let other = Campaign::new("Side Quest", "Elsewhere");
        db.insert_campaign(&other).unwrap();

        let first = Session::new(&campaign.id, "First", date(1));
        let second = Session::new(&campaign.id, "Second", date(8));
        let mut cancelled = Session::new(&campaign.id, "Snowed In", date(15));
        cancelled.status = SessionStatus::Cancelled;
        let elsewhere = Session::new(&other.id, "One-shot", date(20));
        for s in [&first, &second, &cancelled, &elsewhere] {
            db.insert_session(s).unwrap();
        }

        let all = db.list_sessions(&SessionFilter::default()).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].title, "One-shot");

        let in_campaign = db
            .list_sessions(&SessionFilter {
                campaign_id: Some(campaign.id.clone()),
                ..Default::default()
            })
            .unwrap();
        let titles: Vec<_> = in_campaign.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Snowed In", "Second", "First"]);

        let planned = db
            .list_sessions(&SessionFilter {
                campaign_id: Some(campaign.id.clone()),
                status: Some(SessionStatus::Planned),
                limit: Some(1),
            })
            .unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].title, "Second");
    }

    #[test]
    fn test_update_session() {
        let db = test_db();
        let campaign = seed_campaign(&db);
        let session = Session::new(&campaign.id, "Session 2", date(18));
        db.insert_session(&session).unwrap();

        let update = SessionUpdate {
            status: SessionStatus::Completed,
            duration_minutes: 185,
            summary: "Found a clue".to_string(),
            notes: "report".to_string(),
        };
        db.update_session(&session.id, &update).unwrap();

        let retrieved = db.get_session(&session.id).unwrap().unwrap();
        assert_eq!(retrieved.status, SessionStatus::Completed);
        assert_eq!(retrieved.duration_minutes, 185);
        assert_eq!(retrieved.summary, "Found a clue");
        assert_eq!(retrieved.notes, "report");
        assert_eq!(retrieved.title, "Session 2");
    }

    #[test]
    fn test_update_missing_session() {
        let db = test_db();
        let update = SessionUpdate {
            status: SessionStatus::Completed,
            duration_minutes: 0,
            summary: String::new(),
            notes: String::new(),
        };
        assert!(matches!(
            SessionStore::update_session(&db, "ghost", &update),
            Err(Error::SessionNotFound(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_npcs_and_locations() {
        let db = test_db();
        let campaign = seed_campaign(&db);

        let mut npc = Npc::new(&campaign.id, "Captain Vale", "human");
        npc.class = Some("fighter".to_string());
        db.insert_npc(&npc).unwrap();
        db.insert_npc(&Npc::new(&campaign.id, "auntie Moss", "hag"))
            .unwrap();

        let npcs = db.list_npcs(&campaign.id).unwrap();
        let names: Vec<_> = npcs.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["auntie Moss", "Captain Vale"]);
        assert_eq!(npcs[1].class.as_deref(), Some("fighter"));

        let crypt = Location::new(&campaign.id, "Sunken Crypt", LocationKind::Dungeon);
        db.insert_location(&crypt).unwrap();
        let locations = db.list_locations(&campaign.id).unwrap();
        assert_eq!(locations, vec![crypt]);

        assert!(db.list_npcs("other").unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/journal.db");

        {
            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            seed_campaign(&db);
        }

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.list_campaigns().unwrap().len(), 1);
    }
}
