use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

use deposit_tracker::config::Config;
use deposit_tracker::goals::GoalDraft;
use deposit_tracker::ledger::{Confirm, ConflictChoice, EntryInput, InputMode};
use deposit_tracker::models::{DurationUnit, GoalKind};
use deposit_tracker::storage::{self, export_file_name, export_json, parse_import, ImportMode};
use deposit_tracker::tracker::Tracker;

const USAGE: &str = "\
Usage: tracker <command> [args]

Days:
  show                                   ledger, archive and goals
  add <value> [--amount] [--date D]      append a day (percentage unless --amount)
  edit <day> <value> [--amount] [--date D]
  delete <day> | archive <day>
  restore <n> | purge <n>                n = position in the archive

Goals:
  goals
  goal-add <kind> <target> <name> [--deadline D] [--for N days|weeks|months]
  goal-edit <n> <kind> <target> <name> [--deadline D] [--for N unit]
  goal-delete <n> | goal-complete <n>
  kinds: deposit, growth, streak, hit-rate

Data:
  import <file> [replace|merge|ask]
  export [file]
  stats
  project [days] [target]
  set-deposit <v> | set-leverage <v> | set-target <v>";

/// Asks on the terminal which way to resolve an import conflict.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, title: &str, message: &str, options: &[ConflictChoice]) -> ConflictChoice {
        let labels: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        let stdin = io::stdin();
        loop {
            print!("{}: {} [{}] ", title, message, labels.join("/"));
            let _ = io::stdout().flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                return ConflictChoice::Skip;
            }
            if let Some(choice) = ConflictChoice::from_str_loose(&line) {
                if options.contains(&choice) {
                    return choice;
                }
            }
        }
    }
}

/// Remove `--name` from `args`, returning whether it was there.
fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    }
}

/// Remove `--name <value>` from `args`, returning the value.
fn take_option(args: &mut Vec<String>, name: &str, values: usize) -> Result<Option<Vec<String>>> {
    let Some(i) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if i + values >= args.len() {
        bail!("{} needs {} value(s)", name, values);
    }
    let taken: Vec<String> = args.drain(i..=i + values).skip(1).collect();
    Ok(Some(taken))
}

fn arg<'a>(args: &'a [String], i: usize, what: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .with_context(|| format!("missing {}\n\n{}", what, USAGE))
}

fn parse_f64(raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .replace(',', ".")
        .parse()
        .with_context(|| format!("{} '{}' is not a number", what, raw))
}

/// 1-based position on the command line to a 0-based index.
fn parse_position(raw: &str) -> Result<usize> {
    let n: usize = raw.parse().with_context(|| format!("'{}' is not a position", raw))?;
    if n == 0 {
        bail!("positions start at 1");
    }
    Ok(n - 1)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("'{}' is not a YYYY-MM-DD date", raw))
}

fn goal_draft(args: &mut Vec<String>, offset: usize) -> Result<GoalDraft> {
    let deadline = take_option(args, "--deadline", 1)?.map(|v| v[0].clone());
    let duration = match take_option(args, "--for", 2)? {
        Some(v) => {
            let amount: u32 = v[0]
                .parse()
                .with_context(|| format!("'{}' is not a whole number", v[0]))?;
            let unit = DurationUnit::from_str_loose(&v[1])
                .with_context(|| format!("unknown duration unit '{}'", v[1]))?;
            Some((amount, unit))
        }
        None => None,
    };

    let kind_raw = arg(args, offset, "goal kind")?;
    let kind = GoalKind::from_str_loose(kind_raw)
        .with_context(|| format!("unknown goal kind '{}'", kind_raw))?;
    let target = parse_f64(arg(args, offset + 1, "goal target")?, "target")?;
    let name = args.get(offset + 2..).map(|s| s.join(" ")).unwrap_or_default();

    let mut draft = GoalDraft::new(name, kind, target);
    draft.deadline = deadline;
    draft.duration = duration;
    Ok(draft)
}

fn print_ledger(tracker: &Tracker) {
    let d = &tracker.data;
    println!("\n{}", "=".repeat(60));
    println!(
        "  Initial: ${:.2} | Leverage: x{} | Target: {}%/day",
        d.initial_deposit, d.leverage, d.daily_target
    );
    println!("{}", "=".repeat(60));
    if d.days.is_empty() {
        println!("  No days recorded yet.");
    }
    for day in &d.days {
        println!(
            "  #{:<4} {}  {:>+8.2}%  {:>+12.2}  ${:>12.2}",
            day.sequence_number, day.date, day.percentage, day.amount, day.balance
        );
    }
    println!("  ───────────────────────────────────");
    println!("  Balance: ${:.2} ({:+.2})", d.deposit, d.profit());

    if !d.archived_days.is_empty() {
        println!();
        println!("  ARCHIVE");
        for (i, day) in d.archived_days.iter().enumerate() {
            println!(
                "  {:<4} was #{} {}  {:>+8.2}%",
                i + 1,
                day.sequence_number,
                day.date,
                day.percentage
            );
        }
    }
}

fn print_goals(tracker: &Tracker) {
    let summaries = tracker.goal_summaries();
    println!();
    println!("  GOALS");
    println!("  ───────────────────────────────────");
    if summaries.is_empty() {
        println!("  None.");
    }
    for (i, g) in summaries.iter().enumerate() {
        let left = match g.days_remaining {
            Some(days) if days >= 0 => format!(" | {} days left", days),
            Some(_) => " | deadline passed".to_string(),
            None => String::new(),
        };
        println!(
            "  {:<3} {} ({} {}) {:.0}% [{}]{}",
            i + 1,
            g.name,
            g.kind,
            g.target_value,
            g.progress,
            g.status,
            left
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().cloned() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let mut store = storage::from_config(&cfg);
    let data = store
        .load()
        .await
        .with_context(|| format!("Failed to load from {}", store.describe()))?;
    let mut tracker = Tracker::new(data);
    let stamped = tracker.stamp_missing_created_at();

    let mode = if take_flag(&mut args, "--amount") {
        InputMode::Amount
    } else {
        InputMode::Percentage
    };
    let date = take_option(&mut args, "--date", 1)?
        .map(|v| parse_date(&v[0]))
        .transpose()?;

    let mutated = match command.as_str() {
        "show" => {
            print_ledger(&tracker);
            print_goals(&tracker);
            false
        }
        "add" => {
            let input = EntryInput::parse(mode, arg(&args, 1, "value")?)?;
            tracker.add_day(input, date)?;
            true
        }
        "edit" => {
            let index = parse_position(arg(&args, 1, "day")?)?;
            if let Some(raw) = args.get(2) {
                tracker.edit_day(index, EntryInput::parse(mode, raw)?)?;
            }
            if let Some(date) = date {
                tracker.redate_day(index, date)?;
            }
            true
        }
        "delete" => {
            tracker.delete_day(parse_position(arg(&args, 1, "day")?)?)?;
            true
        }
        "archive" => {
            tracker.archive_day(parse_position(arg(&args, 1, "day")?)?)?;
            true
        }
        "restore" => {
            tracker.restore_day(parse_position(arg(&args, 1, "archive position")?)?)?;
            true
        }
        "purge" => {
            tracker.purge_archived(parse_position(arg(&args, 1, "archive position")?)?)?;
            true
        }
        "goals" => {
            print_goals(&tracker);
            false
        }
        "goal-add" => {
            let draft = goal_draft(&mut args, 1)?;
            tracker.add_goal(draft)?;
            true
        }
        "goal-edit" => {
            let index = parse_position(arg(&args, 1, "goal")?)?;
            let draft = goal_draft(&mut args, 2)?;
            tracker.edit_goal(index, draft)?;
            true
        }
        "goal-delete" => {
            tracker.delete_goal(parse_position(arg(&args, 1, "goal")?)?)?;
            true
        }
        "goal-complete" => {
            tracker.complete_goal(parse_position(arg(&args, 1, "goal")?)?)?;
            true
        }
        "import" => {
            let path = arg(&args, 1, "file")?;
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path))?;
            let imported = parse_import(&text)?;
            match args.get(2).map(String::as_str).unwrap_or("replace") {
                "ask" | "interactive" => tracker.import_interactive(imported, &mut StdinConfirm)?,
                other => {
                    let mode = ImportMode::from_str_loose(other)
                        .with_context(|| format!("unknown import mode '{}'", other))?;
                    tracker.import(imported, mode)?;
                }
            }
            true
        }
        "export" => {
            let path = args
                .get(1)
                .cloned()
                .unwrap_or_else(|| export_file_name(tracker.today()));
            tokio::fs::write(&path, export_json(&tracker.data)?)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            println!("Exported to {}", path);
            false
        }
        "stats" => {
            tracker.stats().print_summary();
            false
        }
        "project" => {
            let days: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(30);
            for point in tracker.projection(days) {
                println!("  day {:>4}  ${:.2}", point.day, point.balance);
            }
            if let Some(raw) = args.get(2) {
                let target = parse_f64(raw, "target")?;
                match tracker.days_to_reach(target) {
                    Some(n) => println!("  ${:.2} reached in {} days", target, n),
                    None => println!("  ${:.2} is out of reach at this target", target),
                }
            }
            false
        }
        "set-deposit" => {
            tracker.set_initial_deposit(parse_f64(arg(&args, 1, "value")?, "deposit")?)?;
            true
        }
        "set-leverage" => {
            tracker.set_leverage(parse_f64(arg(&args, 1, "value")?, "leverage")?)?;
            true
        }
        "set-target" => {
            tracker.set_daily_target(parse_f64(arg(&args, 1, "value")?, "target")?)?;
            true
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            false
        }
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    };

    if mutated || stamped {
        store
            .save(&tracker.data)
            .await
            .with_context(|| format!("Failed to save to {}", store.describe()))?;
    }
    if mutated {
        print_ledger(&tracker);
    }

    Ok(())
}
