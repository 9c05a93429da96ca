use clap::Parser;
use clap::error::ErrorKind;
use planboard_cli::cli::{Cli, Command, collect_overrides};
use planboard_core::config::{self, Config, Palette};
use planboard_core::dashboard::{self, NotificationOutcome, PlanView, TaskDetail};
use planboard_core::error::AppError;
use planboard_core::grouping::row_label;
use planboard_core::model::{Action, Task, dates};
use planboard_core::months::{YearMonth, expand_months};
use planboard_core::notify::notifier_from_env;
use planboard_core::risk::{self, Page, RiskEntry};
use planboard_core::stats::Stats;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use std::time::Duration;
use tabled::{Table, Tabled};
use time::Date;

const TODAY_ENV_VAR: &str = "PLANBOARD_TODAY";

#[derive(Tabled)]
struct RiskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Days left")]
    days: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "Team")]
    name: String,
    #[tabled(rename = "Tasks")]
    total: usize,
    #[tabled(rename = "Done")]
    done: usize,
    #[tabled(rename = "Avg progress")]
    average_progress: String,
    #[tabled(rename = "On time")]
    on_time_rate: String,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    task_id: String,
    #[tabled(rename = "Action")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

#[derive(Serialize)]
struct NotifyReport<'a> {
    notified: Vec<&'a str>,
    failures: Vec<FailureReport<'a>>,
}

#[derive(Serialize)]
struct FailureReport<'a> {
    task_id: &'a str,
    error: String,
}

fn optional_date(date: Option<Date>) -> String {
    date.map(dates::format_date)
        .unwrap_or_else(|| "-".to_string())
}

fn optional_month(month: Option<YearMonth>) -> String {
    month
        .map(|month| month.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id.to_string(),
        name: task.name.clone(),
        month: optional_month(task.period),
        status: task.status.label().to_string(),
        progress: format!("{}%", task.progress.percent()),
        assignee: row_label(&task.assignment),
    }
}

fn action_row(action: &Action) -> ActionRow {
    ActionRow {
        id: action.id.to_string(),
        task_id: action.task_id.to_string(),
        name: action.name.clone(),
        status: action.status.label().to_string(),
        progress: format!("{}%", action.progress.percent()),
        deadline: optional_date(action.deadline),
    }
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_stats_plain(stats: &Stats) {
    println!("Tasks: {}", stats.total_tasks);
    println!(
        "Completed: {} ({:.1}%)",
        stats.completed_count, stats.completion_rate
    );
    println!(
        "On time: {} ({:.1}%)",
        stats.on_time_count, stats.on_time_rate
    );
    println!(
        "Delayed: {} ({} days)",
        stats.delayed_tasks_count, stats.total_delay_days
    );
    println!("Backlog: {}", stats.backlog_count);

    let breakdown = &stats.current_month_breakdown;
    println!(
        "Current month {}: {} tasks",
        stats.current_month, stats.current_month_total
    );
    println!(
        "  completed {} | not started {} | in progress {} | cancelled {}",
        breakdown.completed, breakdown.not_started, breakdown.in_progress, breakdown.cancelled
    );

    if !stats.team_performance.is_empty() {
        let rows = stats
            .team_performance
            .iter()
            .map(|team| TeamRow {
                name: team.name.clone(),
                total: team.total,
                done: team.done_count,
                average_progress: format!("{:.1}%", team.average_progress),
                on_time_rate: format!("{:.1}%", team.on_time_rate),
            })
            .collect();
        println!("{}", render::<TeamRow>(rows));
    }
}

fn print_risks_plain(page: &Page<RiskEntry>, palette: &Palette) {
    if page.items.is_empty() {
        println!("No tasks at risk.");
        return;
    }

    let rows = page
        .items
        .iter()
        .map(|entry| RiskRow {
            id: entry.task.id.to_string(),
            name: entry.task.name.clone(),
            due: optional_date(entry.task.current_end_date),
            days: entry
                .days_remaining
                .map(|days| days.to_string())
                .unwrap_or_else(|| "-".to_string()),
            reason: palette.severity(entry.severity, &entry.label),
        })
        .collect();
    println!("{}", render::<RiskRow>(rows));
    println!(
        "{}",
        palette.mutedize(&format!(
            "Showing {}-{} of {} (page {}/{})",
            page.first_index(),
            page.last_index(),
            page.total,
            page.page,
            page.total_pages.max(1)
        ))
    );
}

fn print_plan_plain(view: &PlanView, palette: &Palette) {
    if let Some(plan) = view.plan.as_ref() {
        let span = match plan.span() {
            Some((start, end)) => format!("{start} to {end}"),
            None => "no span".to_string(),
        };
        println!("{} ({})", palette.accentize(&plan.name), span);
    }

    for group in &view.groups {
        println!();
        println!("{} [{} tasks]", palette.accentize(&group.name), group.task_count());

        let mut builder = Builder::default();
        let mut header = vec!["Assignee".to_string()];
        header.extend(view.months.iter().map(|month| month.to_string()));
        builder.push_record(header);
        for row in group.grid(&view.months) {
            let mut record = vec![row.label];
            record.extend(
                row.cells
                    .iter()
                    .map(|filled| (if *filled { "x" } else { "" }).to_string()),
            );
            builder.push_record(record);
        }
        let mut table = builder.build();
        table.with(Style::psql());
        println!("{table}");
    }

    for task in &view.out_of_range {
        println!(
            "{}",
            palette.mutedize(&format!(
                "Outside plan span: {} {} ({})",
                task.id,
                task.name,
                optional_month(task.period)
            ))
        );
    }
}

fn print_detail_plain(detail: &TaskDetail) {
    let task = &detail.task;
    println!("{} ({})", task.name, task.id);
    println!("Month: {}", optional_month(task.period));
    println!("Status: {}", task.status.label());
    println!("Progress: {}%", task.progress.percent());
    println!("Assignee: {}", row_label(&task.assignment));
    println!("Due: {}", optional_date(task.current_end_date));
    if task.current_delay > 0 || task.extensions > 0 {
        println!(
            "Delay: {} days, extended {} times",
            task.current_delay, task.extensions
        );
    }
    if let Some(description) = task.description.as_deref() {
        println!("Description: {description}");
    }

    let summary = &detail.summary;
    println!(
        "Actions: {} ({} completed, {} in progress, {} pending, average {:.1}%)",
        summary.total,
        summary.completed,
        summary.in_progress,
        summary.pending,
        summary.average_progress
    );
    if !detail.actions.is_empty() {
        let rows = detail.actions.iter().map(action_row).collect();
        println!("{}", render::<ActionRow>(rows));
    }
    if !detail.children.is_empty() {
        println!("Delegated tasks:");
        let rows = detail.children.iter().map(task_row).collect();
        println!("{}", render::<TaskRow>(rows));
    }
}

fn print_notify(outcome: &NotificationOutcome, json: bool) -> Result<(), AppError> {
    for failure in &outcome.failures {
        eprintln!(
            "WARN: failed to notify task {}: {}",
            failure.task_id, failure.error
        );
    }

    if json {
        let report = NotifyReport {
            notified: outcome
                .entries
                .iter()
                .map(|entry| entry.task.id.as_str())
                .collect(),
            failures: outcome
                .failures
                .iter()
                .map(|failure| FailureReport {
                    task_id: failure.task_id.as_str(),
                    error: failure.error.to_string(),
                })
                .collect(),
        };
        return print_json(&report);
    }

    for entry in &outcome.entries {
        println!("Notified: {} ({}) {}", entry.task.name, entry.task.id, entry.label);
    }
    println!("{} notifications sent", outcome.entries.len());
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

fn resolve_today(explicit: Option<&str>) -> Result<Date, AppError> {
    if let Some(raw) = explicit {
        return dashboard::parse_today(raw);
    }
    if let Ok(raw) = std::env::var(TODAY_ENV_VAR)
        && !raw.trim().is_empty()
    {
        return dashboard::parse_today(&raw);
    }
    Ok(dashboard::today_local())
}

fn resolve_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        log::warn!("using default configuration: {err}");
    }
    let overrides = collect_overrides(raw_overrides)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn required_plan(plan: Option<String>, config: &Config) -> Result<String, AppError> {
    plan.or_else(|| config.default_plan.clone())
        .ok_or_else(|| AppError::invalid_input("--plan is required (or set default_plan)"))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli.config_override)?;
    let palette = config::palette_for_theme(config.theme.as_deref());
    let today = resolve_today(cli.today.as_deref())?;
    log::debug!("evaluating as of {today}");

    match cli.command {
        Command::Stats { plan } => {
            let plan = plan.or_else(|| config.default_plan.clone());
            let board = dashboard::dashboard(today, plan.as_deref())?;
            if cli.json {
                print_json(&board.stats)?;
            } else {
                print_stats_plain(&board.stats);
            }
        }
        Command::Risks {
            plan,
            page,
            per_page,
        } => {
            let plan = plan.or_else(|| config.default_plan.clone());
            let board = dashboard::dashboard(today, plan.as_deref())?;
            let page = risk::paginate(&board.risks, page, per_page.unwrap_or(config.page_size()));
            if cli.json {
                print_json(&page)?;
            } else {
                print_risks_plain(&page, &palette);
            }
        }
        Command::Groups { plan } => {
            let view = dashboard::plan_view(&required_plan(plan, &config)?)?;
            if cli.json {
                print_json(&view)?;
            } else {
                print_plan_plain(&view, &palette);
            }
        }
        Command::Month { plan, month } => {
            let month: YearMonth = month
                .parse()
                .map_err(|err| AppError::invalid_input(format!("{err}")))?;
            let tasks = dashboard::month_view(&required_plan(plan, &config)?, month)?;
            if cli.json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No tasks in {month}.");
            } else {
                let rows = tasks.iter().map(task_row).collect();
                println!("{}", render::<TaskRow>(rows));
            }
        }
        Command::Months { start, end } => {
            let months = expand_months(&start, &end);
            if cli.json {
                print_json(&months)?;
            } else {
                for month in &months {
                    println!("{month}");
                }
            }
        }
        Command::Show { id } => {
            let detail = dashboard::task_detail(&id)?;
            if cli.json {
                print_json(&detail)?;
            } else {
                print_detail_plain(&detail);
            }
        }
        Command::Actions { executor } => {
            let actions = dashboard::staff_actions(&executor)?;
            if cli.json {
                print_json(&actions)?;
            } else if actions.is_empty() {
                println!("No actions for {}.", executor.trim());
            } else {
                let rows = actions.iter().map(action_row).collect();
                println!("{}", render::<ActionRow>(rows));
            }
        }
        Command::Notify { wait } => {
            let notifier = notifier_from_env()?;
            let outcome = dashboard::notify_at_risk(today, notifier.as_ref())?;
            print_notify(&outcome, cli.json)?;
            if wait > 0 && !outcome.entries.is_empty() {
                notifier.wait_for_actions(Duration::from_secs(wait));
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
