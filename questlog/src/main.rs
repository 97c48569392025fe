//! questlog - campaign journal and live session runner
//!
//! Manages the campaign records a game master prepares ahead of play and
//! runs a session live from the terminal.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/questlog/journal.db (~/.local/share/questlog/journal.db)
//! - Logs: $XDG_STATE_HOME/questlog/questlog.<date>.log (~/.local/state/questlog/)
//! - Config: $XDG_CONFIG_HOME/questlog/config.toml (~/.config/questlog/config.toml)

mod process_lock;
mod repl;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use process_lock::acquire_run_guard;
use questlog_core::format::{format_minutes, format_relative_time};
use questlog_core::{
    Campaign, Config, Database, Location, LocationKind, Npc, Session, SessionFilter,
    SessionStatus,
};

#[derive(Parser)]
#[command(name = "questlog")]
#[command(about = "Campaign journal and live session runner for tabletop game masters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage campaigns
    #[command(subcommand)]
    Campaign(CampaignCommand),

    /// Manage session records
    #[command(subcommand)]
    Session(SessionCommand),

    /// Manage a campaign's NPCs
    #[command(subcommand)]
    Npc(NpcCommand),

    /// Manage a campaign's locations
    #[command(subcommand)]
    Location(LocationCommand),

    /// Run a session live (commands are read from stdin)
    Run {
        /// Session ID
        session_id: String,

        /// Starting location (overrides runner.default_location)
        #[arg(long)]
        location: Option<String>,
    },
}

#[derive(Subcommand)]
enum CampaignCommand {
    /// Create a campaign
    Add {
        title: String,
        #[arg(long, default_value = "")]
        world: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List campaigns
    List(ListArgs),
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Plan a session
    Add {
        title: String,
        #[arg(long)]
        campaign: String,
        /// Play date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List sessions, latest first
    List {
        #[arg(long)]
        campaign: Option<String>,
        /// planned, completed or cancelled
        #[arg(long)]
        status: Option<SessionStatus>,
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one session, including its notes
    Show {
        session_id: String,
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Subcommand)]
enum NpcCommand {
    /// Add an NPC to a campaign
    Add {
        name: String,
        #[arg(long)]
        campaign: String,
        #[arg(long, default_value = "")]
        race: String,
        #[arg(long)]
        class: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List a campaign's NPCs
    List {
        #[arg(long)]
        campaign: String,
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Subcommand)]
enum LocationCommand {
    /// Add a location to a campaign
    Add {
        name: String,
        #[arg(long)]
        campaign: String,
        /// city, town, village, dungeon, wilderness, landmark or building
        #[arg(long, default_value = "town")]
        kind: LocationKind,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List a campaign's locations
    List {
        #[arg(long)]
        campaign: String,
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        questlog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    match cli.command {
        Command::Campaign(cmd) => campaign(&db, cmd),
        Command::Session(cmd) => session(&db, cmd),
        Command::Npc(cmd) => npc(&db, cmd),
        Command::Location(cmd) => location(&db, cmd),
        Command::Run {
            session_id,
            location,
        } => {
            let session = db
                .get_session(&session_id)
                .context("failed to load session")?
                .with_context(|| format!("session not found: {}", session_id))?;
            let _run_guard = acquire_run_guard(&db_path, &session.id)
                .context("failed to acquire session lock")?;
            let npcs = db
                .list_npcs(&session.campaign_id)
                .context("failed to load NPCs")?;

            let mut runner_config = config.runner.clone();
            if location.is_some() {
                runner_config.default_location = location;
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to build tokio runtime")?;
            runtime.block_on(repl::run(&db, session, npcs, &runner_config))
        }
    }
}

fn campaign(db: &Database, cmd: CampaignCommand) -> Result<()> {
    match cmd {
        CampaignCommand::Add {
            title,
            world,
            description,
        } => {
            let mut campaign = Campaign::new(title, world);
            campaign.description = description;
            db.insert_campaign(&campaign)
                .context("failed to create campaign")?;
            println!("Created campaign {} ({})", campaign.title, campaign.id);
        }
        CampaignCommand::List(list) => {
            let campaigns = db.list_campaigns().context("failed to list campaigns")?;
            if list.json {
                println!("{}", serde_json::to_string_pretty(&campaigns)?);
                return Ok(());
            }
            if campaigns.is_empty() {
                println!("No campaigns yet.");
            }
            for c in &campaigns {
                println!(
                    "{}  {:<28} {:<16} updated {}",
                    c.id,
                    c.title,
                    c.world_name,
                    format_relative_time(c.updated_at)
                );
            }
        }
    }
    Ok(())
}

fn session(db: &Database, cmd: SessionCommand) -> Result<()> {
    match cmd {
        SessionCommand::Add {
            title,
            campaign,
            date,
            description,
            notes,
        } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let mut session = Session::new(campaign, title, date);
            session.description = description;
            session.notes = notes;
            db.insert_session(&session)
                .context("failed to create session")?;
            println!("Created session {} ({})", session.title, session.id);
        }
        SessionCommand::List {
            campaign,
            status,
            limit,
            list,
        } => {
            let filter = SessionFilter {
                campaign_id: campaign,
                status,
                limit,
            };
            let sessions = db.list_sessions(&filter).context("failed to list sessions")?;
            if list.json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            if sessions.is_empty() {
                println!("No sessions found.");
            }
            for s in &sessions {
                println!(
                    "{}  {}  {:<10} {:>7}  {}",
                    s.id,
                    s.date,
                    s.status.as_str(),
                    format_minutes(s.duration_minutes),
                    s.title
                );
            }
        }
        SessionCommand::Show { session_id, list } => {
            let s = db
                .get_session(&session_id)
                .context("failed to load session")?
                .with_context(|| format!("session not found: {}", session_id))?;
            if list.json {
                println!("{}", serde_json::to_string_pretty(&s)?);
                return Ok(());
            }
            println!("{}", s.title);
            println!("  ID:       {}", s.id);
            println!("  Campaign: {}", s.campaign_id);
            println!("  Date:     {}", s.date);
            println!("  Status:   {}", s.status);
            println!("  Duration: {}", format_minutes(s.duration_minutes));
            if !s.description.is_empty() {
                println!("\n{}", s.description);
            }
            if !s.summary.is_empty() {
                println!("\nSummary:\n{}", s.summary);
            }
            if !s.notes.is_empty() {
                println!("\nNotes:\n{}", s.notes);
            }
        }
    }
    Ok(())
}

fn npc(db: &Database, cmd: NpcCommand) -> Result<()> {
    match cmd {
        NpcCommand::Add {
            name,
            campaign,
            race,
            class,
            description,
        } => {
            let mut npc = Npc::new(campaign, name, race);
            npc.class = class;
            npc.description = description;
            db.insert_npc(&npc).context("failed to add NPC")?;
            println!("Added NPC {} ({})", npc.name, npc.id);
        }
        NpcCommand::List { campaign, list } => {
            let npcs = db.list_npcs(&campaign).context("failed to list NPCs")?;
            if list.json {
                println!("{}", serde_json::to_string_pretty(&npcs)?);
                return Ok(());
            }
            for n in &npcs {
                let class = n.class.as_deref().unwrap_or("-");
                println!("{:<24} {:<12} {:<12} {}", n.name, n.race, class, n.status.as_str());
            }
        }
    }
    Ok(())
}

fn location(db: &Database, cmd: LocationCommand) -> Result<()> {
    match cmd {
        LocationCommand::Add {
            name,
            campaign,
            kind,
            description,
        } => {
            let mut location = Location::new(campaign, name, kind);
            location.description = description;
            db.insert_location(&location)
                .context("failed to add location")?;
            println!("Added location {} ({})", location.name, location.id);
        }
        LocationCommand::List { campaign, list } => {
            let locations = db
                .list_locations(&campaign)
                .context("failed to list locations")?;
            if list.json {
                println!("{}", serde_json::to_string_pretty(&locations)?);
                return Ok(());
            }
            for l in &locations {
                println!("{:<24} {:<10} {}", l.name, l.kind.as_str(), l.description);
            }
        }
    }
    Ok(())
}
