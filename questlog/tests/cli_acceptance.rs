use questlog_core::{Database, SessionFilter, SessionStatus};
use std::fs;
use std::path::PathBuf;
use std::process::Output;
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    xdg_runtime: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");
        let xdg_runtime = base.join("xdg-runtime");

        for dir in [&home, &xdg_data, &xdg_config, &xdg_state, &xdg_runtime] {
            fs::create_dir_all(dir).expect("failed to create test directory");
        }

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
            xdg_runtime,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("questlog/journal.db")
    }

    fn open_db(&self) -> Database {
        let db = Database::open(&self.db_path()).expect("failed to open db");
        db.migrate().expect("failed to migrate db");
        db
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("questlog");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }
}

fn run_cli(env: &CliTestEnv, args: &[&str], stdin: &str) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("questlog"));

    assert_cmd::Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env("XDG_RUNTIME_DIR", &env.xdg_runtime)
        .env_remove("RUST_LOG")
        .write_stdin(stdin)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute questlog: {e}"))
}

fn assert_success(args: &[&str], output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return stdout;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "questlog {} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        output.status,
        stdout,
        stderr
    );
}

fn cli(env: &CliTestEnv, args: &[&str]) -> String {
    assert_success(args, &run_cli(env, args, ""))
}

/// Create a campaign and one planned session, returning their IDs
fn seed(env: &CliTestEnv) -> (String, String) {
    cli(env, &["campaign", "add", "Curse of the Tides", "--world", "Saltmarsh"]);
    let db = env.open_db();
    let campaign_id = db.list_campaigns().expect("list campaigns")[0].id.clone();

    cli(
        env,
        &[
            "session",
            "add",
            "The Sunken Keep",
            "--campaign",
            &campaign_id,
            "--date",
            "2026-10-17",
            "--notes",
            "Prep: bring the tide tables",
        ],
    );
    let session_id = db
        .list_sessions(&SessionFilter::default())
        .expect("list sessions")[0]
        .id
        .clone();

    (campaign_id, session_id)
}

#[test]
fn records_are_created_and_listed() {
    let env = CliTestEnv::new();
    let (campaign_id, session_id) = seed(&env);

    cli(
        &env,
        &["npc", "add", "Skerrin", "--campaign", &campaign_id, "--race", "Hobgoblin"],
    );
    cli(
        &env,
        &["location", "add", "Flooded Hall", "--campaign", &campaign_id, "--kind", "dungeon"],
    );

    let campaigns = cli(&env, &["campaign", "list"]);
    assert!(campaigns.contains("Curse of the Tides"));

    let sessions = cli(&env, &["session", "list", "--campaign", &campaign_id]);
    assert!(sessions.contains("The Sunken Keep"));
    assert!(sessions.contains("planned"));

    let npcs = cli(&env, &["npc", "list", "--campaign", &campaign_id]);
    assert!(npcs.contains("Skerrin"));

    let locations = cli(&env, &["location", "list", "--campaign", &campaign_id]);
    assert!(locations.contains("Flooded Hall"));
    assert!(locations.contains("dungeon"));

    let shown = cli(&env, &["session", "show", &session_id, "--json"]);
    let json: serde_json::Value = serde_json::from_str(&shown).expect("show --json is JSON");
    assert_eq!(json["status"], "planned");
    assert_eq!(json["notes"], "Prep: bring the tide tables");
}

#[test]
fn session_for_unknown_campaign_is_refused() {
    let env = CliTestEnv::new();
    let args = ["session", "add", "Orphan", "--campaign", "missing"];
    let output = run_cli(&env, &args, "");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to create session"), "stderr:\n{stderr}");
}

#[test]
fn run_writes_report_back_on_end() {
    let env = CliTestEnv::new();
    let (campaign_id, session_id) = seed(&env);
    cli(
        &env,
        &["npc", "add", "Skerrin", "--campaign", &campaign_id, "--race", "Hobgoblin"],
    );

    let script = "\
start
note Found a clue
goto Flooded Hall
talk skerrin
init add Aria 18 pc
init add Skerrin 12
init add Orc ten
next
combat Goblin ambush
roll d20
bogus
end
";
    let args = ["run", &session_id];
    let stdout = assert_success(&args, &run_cli(&env, &args, script));

    assert!(stdout.contains("Session Summary - 00:00:0"), "stdout:\n{stdout}");
    assert!(stdout.contains("initiative score is not an integer"));
    assert!(stdout.contains("unknown command: bogus"));
    assert!(stdout.contains("Saved to session record."));

    let db = env.open_db();
    let stored = db
        .get_session(&session_id)
        .expect("get session")
        .expect("session exists");
    assert_eq!(stored.status, SessionStatus::Completed);
    assert_eq!(stored.summary, "Found a clue");
    assert!(stored
        .notes
        .starts_with("Prep: bring the tide tables\n\nSession Summary - "));
    assert!(stored.notes.contains("Combat Encounters: 1"));
    assert!(stored.notes.contains("] Moved to Flooded Hall"));
    assert!(stored.notes.contains("] Interacted with Skerrin"));
    assert!(stored.notes.contains("] Turn: Skerrin"));
    assert!(stored.notes.contains("] Rolled d20: "));
}

#[test]
fn run_log_filters_timeline() {
    let env = CliTestEnv::new();
    let (_, session_id) = seed(&env);

    let script = "\
start
roll d6
combat Goblin ambush
note Found a clue
log combat
quit
";
    let args = ["run", &session_id];
    let stdout = assert_success(&args, &run_cli(&env, &args, script));

    assert!(stdout.contains("Rolled d6: "), "stdout:\n{stdout}");
    assert!(
        stdout.contains("1 of 4 events (note 1, combat 1, event 2)"),
        "stdout:\n{stdout}"
    );
}

#[test]
fn run_without_end_saves_nothing() {
    let env = CliTestEnv::new();
    let (_, session_id) = seed(&env);

    let args = ["run", &session_id];
    let stdout = assert_success(&args, &run_cli(&env, &args, "start\nnote Lost in thought\n"));
    assert!(stdout.contains("nothing was saved"));

    let stored = env.open_db().get_session(&session_id).unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Planned);
    assert_eq!(stored.notes, "Prep: bring the tide tables");
}

#[test]
fn run_rejects_illegal_transitions() {
    let env = CliTestEnv::new();
    let (_, session_id) = seed(&env);

    let args = ["run", &session_id];
    let stdout = assert_success(&args, &run_cli(&env, &args, "end\npause\nstart\nstart\nquit\n"));
    assert!(stdout.contains("cannot end a session that is idle"));
    assert!(stdout.contains("cannot pause a session that is idle"));
    assert!(stdout.contains("cannot start a session that is running"));

    let stored = env.open_db().get_session(&session_id).unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Planned);
}

#[test]
fn run_unknown_session_fails() {
    let env = CliTestEnv::new();
    let output = run_cli(&env, &["run", "no-such-session"], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("session not found"), "stderr:\n{stderr}");
}

#[test]
fn invalid_config_is_reported() {
    let env = CliTestEnv::new();
    env.write_config("[runner]\ntick_interval_ms = 0\n");
    let output = run_cli(&env, &["campaign", "list"], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "stderr:\n{stderr}");
}
