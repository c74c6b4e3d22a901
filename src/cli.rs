use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::client::CachePolicy;
use crate::crm::EntityKind;
use crate::crm::forms::STUDENT_STATUSES;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Paginated, filtered list views over a CRM GraphQL API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

impl OutputOptions {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

/// Options shared by `ls` and `browse`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Which list to show
    #[arg(value_enum)]
    pub entity: EntityKind,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter as key=value; `key=` clears it. Repeatable.
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Page to start on (1-based)
    #[arg(long, default_value = "1", value_parser = parse_positive)]
    pub page: u32,

    /// Rows per page (default: list.page_size)
    #[arg(long, value_parser = parse_positive)]
    pub page_size: Option<u32>,

    /// Cache policy (default: list.cache_policy)
    #[arg(long, value_parser = parse_cache_policy)]
    pub policy: Option<CachePolicy>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one page of a list
    #[command(visible_alias = "l")]
    Ls {
        #[command(flatten)]
        list: ListArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Page through a list interactively on stdin
    #[command(visible_alias = "b")]
    Browse {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Student counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Current billing summary
    Billing {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,

        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
    },

    /// Manage students
    Student {
        #[command(subcommand)]
        action: StudentAction,

        /// Output as JSON
        #[arg(long, global = true)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Create a tag
    Create {
        /// Tag name (at most 50 characters)
        name: String,

        /// Hex color, e.g. #1E90FF
        #[arg(long)]
        color: Option<String>,
    },
    /// Update a tag
    Update {
        /// Tag ID
        #[arg(value_parser = parse_id)]
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a tag
    Delete {
        /// Tag ID
        #[arg(value_parser = parse_id)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum StudentAction {
    /// Create a student
    Create {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: Option<String>,

        /// active or inactive
        #[arg(long, value_parser = parse_status)]
        status: Option<String>,
    },
    /// Update a student
    Update {
        /// Student ID
        #[arg(value_parser = parse_id)]
        id: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// active or inactive
        #[arg(long, value_parser = parse_status)]
        status: Option<String>,
    },
    /// Delete a student
    Delete {
        /// Student ID
        #[arg(value_parser = parse_id)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api.url, api.timeout, auth.token, list.page_size, list.debounce_ms, list.cache_policy)
        key: String,
        /// Value to set
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            LsOptions, cmd_billing, cmd_browse, cmd_config_get, cmd_config_set, cmd_config_show,
            cmd_ls, cmd_stats, cmd_student_create, cmd_student_delete, cmd_student_update,
            cmd_tag_create, cmd_tag_delete, cmd_tag_update,
        };
        use crate::crm::forms::{StudentForm, StudentPatch, TagForm, TagPatch};

        match self {
            Commands::Ls { list, json } => {
                cmd_ls(LsOptions::from(list), OutputOptions::new(json)).await
            }
            Commands::Browse { list } => cmd_browse(LsOptions::from(list)).await,

            Commands::Stats { json } => cmd_stats(OutputOptions::new(json)).await,
            Commands::Billing { json } => cmd_billing(OutputOptions::new(json)).await,

            Commands::Tag { action, json } => {
                let output = OutputOptions::new(json);
                match action {
                    TagAction::Create { name, color } => {
                        cmd_tag_create(TagForm { name, color }, output).await
                    }
                    TagAction::Update { id, name, color } => {
                        cmd_tag_update(&id, TagPatch { name, color }, output).await
                    }
                    TagAction::Delete { id } => cmd_tag_delete(&id, output).await,
                }
            }

            Commands::Student { action, json } => {
                let output = OutputOptions::new(json);
                match action {
                    StudentAction::Create {
                        first_name,
                        last_name,
                        email,
                        status,
                    } => {
                        let form = StudentForm {
                            first_name,
                            last_name,
                            email,
                            status,
                        };
                        cmd_student_create(form, output).await
                    }
                    StudentAction::Update {
                        id,
                        first_name,
                        last_name,
                        email,
                        status,
                    } => {
                        let patch = StudentPatch {
                            first_name,
                            last_name,
                            email,
                            status,
                        };
                        cmd_student_update(&id, patch, output).await
                    }
                    StudentAction::Delete { id } => cmd_student_delete(&id, output).await,
                }
            }

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(OutputOptions::new(json)),
                ConfigAction::Set { key, value, json } => {
                    cmd_config_set(&key, &value, OutputOptions::new(json))
                }
                ConfigAction::Get { key, json } => cmd_config_get(&key, OutputOptions::new(json)),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_cache_policy(s: &str) -> Result<CachePolicy, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "cache policy",
        &["cache-first", "cache-and-network", "network-only"],
    )
}

fn parse_status(s: &str) -> Result<String, String> {
    parse_with_validation(
        s,
        |v| {
            let v = v.to_ascii_lowercase();
            if STUDENT_STATUSES.contains(&v.as_str()) {
                Ok(v)
            } else {
                Err(String::new())
            }
        },
        "status",
        STUDENT_STATUSES,
    )
}

fn parse_positive(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("'{s}' must be a whole number of at least 1")),
    }
}

fn parse_id(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("ID cannot be empty".to_string());
    }

    if !s
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            "ID must contain only alphanumeric characters, hyphens, and underscores".to_string(),
        );
    }

    Ok(s.to_string())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "roster", &mut io::stdout());
}
