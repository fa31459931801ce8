use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tabled::{Table, Tabled};
use taskdeck_cli::cli::{Cli, Command};
use taskdeck_core::config::{Config, load_config_with_fallback};
use taskdeck_core::error::AppError;
use taskdeck_core::model::{Priority, Task};
use taskdeck_core::notify::{ActionOutcome, DeadlineNotifier, NoopScheduler};
use taskdeck_core::storage::FileStorage;
use taskdeck_core::store::{Mutation, TaskStore};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

const STORE_DIR_ENV_VAR: &str = "TASKDECK_STORE_PATH";

fn open_store(config: &Config) -> Result<TaskStore, AppError> {
    if std::env::var(STORE_DIR_ENV_VAR).is_ok_and(|value| !value.trim().is_empty()) {
        return TaskStore::open_default();
    }

    match config.store_path.as_deref() {
        Some(dir) if !dir.trim().is_empty() => {
            Ok(TaskStore::new(Box::new(FileStorage::new(dir))))
        }
        _ => TaskStore::open_default(),
    }
}

fn build_notifier(config: &Config) -> DeadlineNotifier {
    if config.notifications_enabled() {
        DeadlineNotifier::from_env()
    } else {
        DeadlineNotifier::new(Box::new(NoopScheduler))
    }
}

fn parse_priority(raw: &str) -> Result<Priority, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        _ => Err(AppError::invalid_input(
            "priority must be low, medium or high",
        )),
    }
}

fn parse_deadline(raw: &str) -> Result<i64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("deadline is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok((parsed.unix_timestamp_nanos() / 1_000_000) as i64);
    }

    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = time::Date::parse(trimmed, &date_only) {
        let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
        let midnight = date.midnight().assume_offset(offset);
        return Ok((midnight.unix_timestamp_nanos() / 1_000_000) as i64);
    }

    Err(AppError::invalid_input(
        "deadline must be RFC3339 or YYYY-MM-DD",
    ))
}

fn format_epoch_ms(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|stamp| stamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| ms.to_string())
}

fn status_label(task: &Task) -> &'static str {
    if task.completed { "completed" } else { "open" }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Alert")]
    alert: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            status: status_label(task),
            priority: task.priority.label(),
            deadline: task.deadline.map(format_epoch_ms).unwrap_or_else(|| "-".to_string()),
            alert: task
                .notification_id
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn print_tasks_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from_task).collect();
    println!("{}", Table::new(rows));
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "priority": task.priority.label(),
        "createdAt": task.created_at,
        "deadline": task.deadline,
        "notificationId": task.notification_id,
    })
}

fn print_tasks_json(tasks: &[Task]) {
    let payload: Vec<serde_json::Value> = tasks.iter().map(task_json).collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn not_found(id: i64) -> AppError {
    AppError::invalid_input(format!("task {id} not found"))
}

fn run_command(cli: Cli, store: &TaskStore, notifier: &DeadlineNotifier) -> Result<(), AppError> {
    match cli.command {
        Command::Add {
            text,
            priority,
            deadline,
        } => {
            let text = match text {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("text is required")),
            };
            let priority = parse_priority(&priority)?;
            let deadline = deadline.as_deref().map(parse_deadline).transpose()?;

            let task = taskdeck_core::api::add_task(store, notifier, &text, priority, deadline)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added task: {} ({})", task.text, task.id);
                if let Some(handle) = task.notification_id.as_deref() {
                    println!("Deadline alert scheduled ({handle})");
                }
            }
        }
        Command::List { pending, completed } => {
            let mut tasks = taskdeck_core::api::refresh(store);
            if pending {
                tasks.retain(|task| !task.completed);
            } else if completed {
                tasks.retain(|task| task.completed);
            }

            if cli.json {
                print_tasks_json(&tasks);
            } else {
                print_tasks_table(&tasks);
            }
        }
        Command::Show { id } => {
            let task = store.get(id).ok_or_else(|| not_found(id))?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("{} ({})", task.text, task.id);
                println!("  status:   {}", status_label(&task));
                println!("  priority: {}", task.priority.label());
                println!("  created:  {}", format_epoch_ms(task.created_at));
                match task.deadline {
                    Some(deadline) => println!("  deadline: {}", format_epoch_ms(deadline)),
                    None => println!("  deadline: -"),
                }
                if let Some(handle) = task.notification_id.as_deref() {
                    println!("  alert:    {handle}");
                }
            }
        }
        Command::Done { id } => {
            match taskdeck_core::api::set_completed(store, notifier, id, true)? {
                Mutation::Applied => println!("Completed task {id}"),
                Mutation::NotFound => return Err(not_found(id)),
            }
        }
        Command::Reopen { id } => {
            match taskdeck_core::api::set_completed(store, notifier, id, false)? {
                Mutation::Applied => println!("Reopened task {id}"),
                Mutation::NotFound => return Err(not_found(id)),
            }
        }
        Command::Delete { id } => {
            match taskdeck_core::api::remove_task(store, notifier, id)? {
                Mutation::Applied => println!("Deleted task {id}"),
                Mutation::NotFound => return Err(not_found(id)),
            }
        }
        Command::NotifyAction { action, id } => {
            match notifier.handle_action(store, &action, Some(id)) {
                ActionOutcome::Deleted(id) => println!("Deleted task {id}"),
                ActionOutcome::AlreadyGone(id) => println!("Task {id} was already gone"),
                ActionOutcome::OpenTask(id) => {
                    // The CLI's stand-in for foregrounding the app.
                    let task = store.get(id).ok_or_else(|| not_found(id))?;
                    println!("{} ({})", task.text, task.id);
                }
                ActionOutcome::Ignored => {
                    return Err(AppError::invalid_input(format!(
                        "unknown notification action: {action}"
                    )));
                }
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }

    if quote.is_some() {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive(store: &TaskStore, notifier: &DeadlineNotifier) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {err}");
                continue;
            }
        };
        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdeck".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, store, notifier) {
            eprintln!("ERROR: {err}");
        }
    }

    Ok(())
}

fn main() {
    // A broken logger must never take the CLI down with it.
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")
        .ok()
        .and_then(|logger| logger.start().ok());

    let config_load = load_config_with_fallback();
    if let Some(err) = &config_load.error {
        log::warn!("config ignored: {err}");
    }

    let store = match open_store(&config_load.config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };
    let notifier = build_notifier(&config_load.config);

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&store, &notifier) {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &store, &notifier) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
