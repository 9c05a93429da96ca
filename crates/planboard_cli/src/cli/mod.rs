use clap::{Parser, Subcommand};
use planboard_core::config::ConfigOverrides;
use planboard_core::error::AppError;
use planboard_core::risk::PAGE_SIZES;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monthly plan dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date
    #[arg(long, value_name = "YYYY-MM-DD", global = true)]
    pub today: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show completion, timeliness, backlog and team statistics
    ///
    /// Example: planboard stats --plan 12
    Stats {
        #[arg(long)]
        plan: Option<String>,
    },
    /// List at-risk tasks, earliest deadline first
    ///
    /// Example: planboard risks --page 2 --per-page 50
    Risks {
        #[arg(long)]
        plan: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, value_parser = parse_page_size)]
        per_page: Option<usize>,
    },
    /// Show the month grid of every task group in a plan
    ///
    /// Example: planboard groups --plan 12
    Groups {
        #[arg(long)]
        plan: Option<String>,
    },
    /// Show the task scheduled in one month for every group of a plan
    ///
    /// Example: planboard month --plan 12 2024-09
    Month {
        #[arg(long)]
        plan: Option<String>,
        month: String,
    },
    /// Expand an inclusive month range
    ///
    /// Example: planboard months 2024-11 2025-02
    Months { start: String, end: String },
    /// Show a task with its actions and child tasks
    ///
    /// Example: planboard show 42
    Show { id: String },
    /// List actions owned by one staff member
    ///
    /// Example: planboard actions --executor 7
    Actions {
        #[arg(long)]
        executor: String,
    },
    /// Send desktop notifications for overdue and approaching deadlines
    ///
    /// Example: planboard notify --wait 60
    Notify {
        /// Seconds to keep running so a notification's Open button can open the task (0 exits at once)
        #[arg(long, value_name = "SECONDS", default_value_t = 30)]
        wait: u64,
    },
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    RiskPageSize,
    DefaultPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "risk_page_size" | "page_size" => ConfigOverrideTarget::RiskPageSize,
        "default_plan" | "plan" => ConfigOverrideTarget::DefaultPlan,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` argument into one set of overrides; later values win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for argument in raw {
        let parsed = parse_config_override(argument)
            .map_err(|err| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {err}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::RiskPageSize => {
                let size = parse_page_size(&parsed.value).map_err(|err| {
                    AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {err}"))
                })?;
                overrides.risk_page_size = Some(size);
            }
            ConfigOverrideTarget::DefaultPlan => overrides.default_plan = Some(parsed.value),
        }
    }
    Ok(overrides)
}

pub fn parse_page_size(raw: &str) -> Result<usize, String> {
    let size: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a page size", raw.trim()))?;
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of 10, 50 or 100, got {size}"))
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
