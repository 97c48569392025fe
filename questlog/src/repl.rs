//! Line-oriented live session driver.
//!
//! Reads one command per line from stdin while the session clock ticks in
//! the background. Rejected commands are printed and the loop carries on.

use anyhow::Result;
use questlog_core::config::RunnerConfig;
use questlog_core::format::format_clock;
use questlog_core::{
    Database, DiceRoller, Die, Error, EventKind, LiveSession, Npc, QuickAction, Rejected,
    RunnerPhase, RunnerTab, Session, SessionEvent, SessionRunner,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  start                          start the session clock
  pause                          pause, or resume if paused
  end                            end the session and save the report
  retry                          retry saving after a failed end
  note|combat|roleplay|event <text>
                                 log an event
  goto <location>                travel and log the move
  talk <npc name>                log an interaction with an NPC
  roll d<N>                      roll a die, e.g. roll d20
  quick <combat|roleplay|location|event|objective>
                                 log a canned event
  init add <name> <score> [pc]   add a combatant
  init rm <position>             remove a combatant
  init hp <position> <hp> [max]  set hit points
  init cond <position> <name>    toggle a condition
  next                           pass the turn
  tab <notes|npcs|combat|locations|actions>
  status                         clock, location and initiative
  log [kind] [text]              events newest first, filtered by kind
                                 and by text in content, location or NPCs
  help                           this list
  quit                           leave without saving";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    End,
    Retry,
    Record(EventKind, String),
    Goto(String),
    Talk(String),
    Roll(Die),
    Quick(QuickAction),
    InitAdd {
        name: String,
        score: String,
        pc: bool,
    },
    InitRemove(usize),
    InitHp {
        position: usize,
        hp: i32,
        max_hp: Option<i32>,
    },
    InitCondition {
        position: usize,
        condition: String,
    },
    Next,
    Tab(RunnerTab),
    Status,
    Log {
        kind: Option<EventKind>,
        text: String,
    },
    Help,
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse(line: &str) -> std::result::Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "start" => Command::Start,
        "pause" | "resume" => Command::Pause,
        "end" => Command::End,
        "retry" => Command::Retry,
        "note" | "combat" | "roleplay" | "event" => {
            let kind = word.parse::<EventKind>()?;
            Command::Record(kind, required(rest, word)?)
        }
        "goto" => Command::Goto(required(rest, "goto")?),
        "talk" => Command::Talk(required(rest, "talk")?),
        "roll" => Command::Roll(rest.parse::<Die>()?),
        "quick" => Command::Quick(rest.parse::<QuickAction>()?),
        "init" => parse_init(rest)?,
        "next" => Command::Next,
        "tab" => Command::Tab(rest.parse::<RunnerTab>()?),
        "status" => Command::Status,
        "log" => parse_log(rest),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(Some(command))
}

fn required(rest: &str, word: &str) -> std::result::Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {} <text>", word))
    } else {
        Ok(rest.to_string())
    }
}

/// A leading event kind narrows the timeline; the rest is search text
fn parse_log(rest: &str) -> Command {
    let (first, tail) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail.trim()),
        None => (rest, ""),
    };
    let kind = match first {
        "location" => Some(EventKind::LocationChange),
        other => other.parse::<EventKind>().ok(),
    };
    match kind {
        Some(kind) => Command::Log {
            kind: Some(kind),
            text: tail.to_string(),
        },
        None => Command::Log {
            kind: None,
            text: rest.to_string(),
        },
    }
}

fn parse_init(rest: &str) -> std::result::Result<Command, String> {
    let mut args: Vec<&str> = rest.split_whitespace().collect();
    if args.is_empty() {
        return Err("usage: init <add|rm|hp|cond> ...".to_string());
    }
    let sub = args.remove(0);

    match sub {
        "add" => {
            let pc = args.last() == Some(&"pc");
            if pc {
                args.pop();
            }
            let score = args
                .pop()
                .ok_or_else(|| "usage: init add <name> <score> [pc]".to_string())?;
            Ok(Command::InitAdd {
                name: args.join(" "),
                score: score.to_string(),
                pc,
            })
        }
        "rm" => Ok(Command::InitRemove(position(args.first())?)),
        "hp" => {
            let hp = args
                .get(1)
                .and_then(|v| v.parse::<i32>().ok())
                .ok_or_else(|| "usage: init hp <position> <hp> [max]".to_string())?;
            let max_hp = match args.get(2) {
                Some(v) => Some(
                    v.parse::<i32>()
                        .map_err(|_| format!("not a number: {}", v))?,
                ),
                None => None,
            };
            Ok(Command::InitHp {
                position: position(args.first())?,
                hp,
                max_hp,
            })
        }
        "cond" => {
            let condition = args
                .get(1..)
                .filter(|words| !words.is_empty())
                .map(|words| words.join(" "))
                .ok_or_else(|| "usage: init cond <position> <condition>".to_string())?;
            Ok(Command::InitCondition {
                position: position(args.first())?,
                condition,
            })
        }
        other => Err(format!("unknown init command: {}", other)),
    }
}

fn position(arg: Option<&&str>) -> std::result::Result<usize, String> {
    arg.and_then(|v| v.parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .ok_or_else(|| "expected a position (1, 2, ...) from `status`".to_string())
}

enum Input {
    Line(Option<String>),
    Tick,
}

/// Drive a session from stdin until `quit` or end of input.
pub async fn run(
    db: &Database,
    session: Session,
    npcs: Vec<Npc>,
    config: &RunnerConfig,
) -> Result<()> {
    let location = config.default_location.clone().unwrap_or_default();
    let runner = SessionRunner::new(session).with_location(location);
    let mut live = LiveSession::new(runner, config.tick_interval());
    let mut roller = DiceRoller::from_seed(config.dice_seed);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(s) = live.runner().session() {
        println!("Running \"{}\" ({}). Type `help` for commands.", s.title, s.date);
    }

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            _ = live.next_tick() => Input::Tick,
        };

        let line = match input {
            Input::Tick => continue,
            Input::Line(None) => break,
            Input::Line(Some(line)) => line,
        };

        match parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(&mut live, db, &npcs, &mut roller, command),
            Err(message) => println!("{}", message),
        }
    }

    live.teardown();
    let runner = live.into_runner();
    if runner.phase() != RunnerPhase::Ended {
        println!("Left without ending the session; nothing was saved.");
    } else if !runner.is_written_back() && runner.session().is_some() {
        println!("The session report was not saved.");
    }
    tracing::info!(phase = %runner.phase(), events = runner.log().len(), "Run finished");
    Ok(())
}

fn execute(
    live: &mut LiveSession,
    db: &Database,
    npcs: &[Npc],
    roller: &mut DiceRoller,
    command: Command,
) {
    match command {
        Command::Start => report(live.apply(|r| r.start().map(render_event))),
        Command::Pause => report(live.apply(|r| r.toggle_pause().map(render_event))),
        Command::End => match live.apply(|r| r.end_session(db)) {
            Ok(wrap_up) => {
                println!("{}", wrap_up.report);
                if live.runner().is_written_back() {
                    println!("\nSaved to session record.");
                }
            }
            Err(Error::Rejected(rejected)) => println!("{}", rejected),
            Err(e) => println!("Failed to save the session: {}. Type `retry` to try again.", e),
        },
        Command::Retry => match live.apply(|r| r.retry_write_back(db)) {
            Ok(()) => println!("Saved to session record."),
            Err(e) => println!("Failed to save the session: {}", e),
        },
        Command::Record(kind, text) => {
            println!("{}", live.apply(|r| render_event(r.record(kind, text))));
        }
        Command::Goto(place) => println!("{}", live.apply(|r| render_event(r.travel_to(place)))),
        Command::Talk(name) => {
            match npcs.iter().find(|n| n.name.eq_ignore_ascii_case(&name)) {
                Some(npc) => println!("{}", live.apply(|r| render_event(r.interact_with(npc)))),
                None => println!("no NPC named {} in this campaign", name),
            }
        }
        Command::Roll(die) => {
            println!("{}", live.apply(|r| render_event(r.roll(die, roller).1)));
        }
        Command::Quick(action) => {
            println!("{}", live.apply(|r| render_event(r.quick_action(action))));
        }
        Command::InitAdd { name, score, pc } => report(live.apply(|r| {
            r.add_combatant_from_input(&name, &score, pc)
                .map(|e| format!("Added {} ({})", e.name, e.initiative))
        })),
        Command::InitRemove(position) => {
            let Some(id) = combatant_id(live, position) else {
                return;
            };
            report(live.apply(|r| r.remove_combatant(&id).map(|e| format!("Removed {}", e.name))));
        }
        Command::InitHp {
            position,
            hp,
            max_hp,
        } => {
            let Some(id) = combatant_id(live, position) else {
                return;
            };
            report(live.apply(|r| {
                r.initiative_mut()
                    .set_hp(&id, hp, max_hp)
                    .map(|()| "HP updated".to_string())
            }));
        }
        Command::InitCondition {
            position,
            condition,
        } => {
            let Some(id) = combatant_id(live, position) else {
                return;
            };
            report(live.apply(|r| -> std::result::Result<String, Rejected> {
                let initiative = r.initiative_mut();
                if initiative.remove_condition(&id, &condition)? {
                    Ok(format!("Removed condition {}", condition))
                } else {
                    initiative.add_condition(&id, &condition)?;
                    Ok(format!("Added condition {}", condition))
                }
            }));
        }
        Command::Next => match live.apply(|r| r.advance_turn().map(render_event)) {
            Some(line) => println!("{}", line),
            None => println!("Nobody is in initiative."),
        },
        Command::Tab(tab) => {
            live.apply(|r| r.set_active_tab(tab));
            println!("Tab: {}", tab.as_str());
        }
        Command::Status => print_status(live.runner()),
        Command::Log { kind, text } => {
            let log = live.runner().log();
            let matches = log.search(kind, &text);
            let counts: Vec<String> = log
                .counts()
                .iter()
                .map(|(kind, n)| format!("{} {}", kind, n))
                .collect();
            println!("{} of {} events ({})", matches.len(), log.len(), counts.join(", "));
            for event in matches {
                println!("{}", render_event(event));
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn report<E: std::fmt::Display>(outcome: std::result::Result<String, E>) {
    match outcome {
        Ok(line) => println!("{}", line),
        Err(e) => println!("{}", e),
    }
}

fn combatant_id(live: &LiveSession, position: usize) -> Option<String> {
    let entry = position
        .checked_sub(1)
        .and_then(|i| live.runner().initiative().entries().get(i));
    if entry.is_none() {
        println!("no combatant at position {}", position);
    }
    entry.map(|e| e.id.clone())
}

fn render_event(event: &SessionEvent) -> String {
    let mut line = format!(
        "[{}] {:<15} {}",
        format_clock(event.timestamp_seconds),
        event.kind.as_str(),
        event.content
    );
    if !event.location.is_empty() {
        line.push_str(&format!("  @ {}", event.location));
    }
    line
}

fn print_status(runner: &SessionRunner) {
    println!(
        "{}  {}  location: {}  tab: {}",
        runner.phase(),
        format_clock(runner.elapsed_seconds()),
        if runner.location().is_empty() {
            "-"
        } else {
            runner.location()
        },
        runner.active_tab().as_str()
    );

    let initiative = runner.initiative();
    for (i, entry) in initiative.entries().iter().enumerate() {
        let marker = if i == initiative.current_index() { ">" } else { " " };
        let mut line = format!(
            "{} {}. {:<20} {:>3}",
            marker,
            i + 1,
            entry.name,
            entry.initiative
        );
        if entry.is_player_character {
            line.push_str("  PC");
        }
        if let Some(hp) = entry.hp {
            match entry.max_hp {
                Some(max) => line.push_str(&format!("  HP {}/{}", hp, max)),
                None => line.push_str(&format!("  HP {}", hp)),
            }
        }
        if !entry.conditions.is_empty() {
            let conditions: Vec<&str> = entry.conditions.iter().map(String::as_str).collect();
            line.push_str(&format!("  [{}]", conditions.join(", ")));
        }
        println!("{}", line);
    }
}
