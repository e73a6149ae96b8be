//! # planboard
//!
//! Command-line client: sign in, pick a plan, view its dashboard, and
//! create tasks.

#![deny(unsafe_code)]

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use planboard_auth::{
    CredentialProvider, DeviceCode, DeviceCodePrompt, IdentityBoundary, IdentityConfig,
    MicrosoftIdentity, ScopeSet,
};
use planboard_core::{BucketId, PlanId, UserId};
use planboard_graph::{GraphPlannerApi, PlannerApi};
use planboard_planner::{
    PlanCache, PlanRepository, PlannerError, TaskAggregator, TaskDraft, TaskWriter, resolve_path,
    resolve_route,
};
use planboard_settings::PlanboardSettings;

/// Planner dashboards from the terminal.
#[derive(Parser, Debug)]
#[command(name = "planboard", version, about = "Planner dashboards from the terminal")]
struct Cli {
    /// Settings file (defaults to `~/.planboard/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level or `EnvFilter` directive (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with a device code.
    Login,
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in account and where a screen path leads.
    Status {
        /// Screen path to resolve (`/`, `/plans`, `/dashboard`, ...).
        /// Without one, shows the landing route.
        path: Option<String>,
        /// Plan currently selected.
        #[arg(long)]
        plan: Option<String>,
    },
    /// List the plans visible to the account.
    Plans,
    /// Show a plan's completion rate and tasks.
    Dashboard {
        /// Plan to show.
        plan_id: String,
    },
    /// Create a task in a plan.
    CreateTask(CreateTaskArgs),
}

#[derive(clap::Args, Debug)]
struct CreateTaskArgs {
    /// Plan to create the task in.
    plan_id: String,
    /// Bucket (defaults to the plan's first bucket).
    #[arg(long)]
    bucket: Option<String>,
    /// Task title.
    #[arg(long)]
    title: String,
    /// Start date, RFC 3339 or `YYYY-MM-DD`.
    #[arg(long)]
    start: Option<String>,
    /// Due date, RFC 3339 or `YYYY-MM-DD`.
    #[arg(long)]
    due: Option<String>,
    /// Assignee user ID (repeatable).
    #[arg(long = "assignee")]
    assignees: Vec<String>,
    /// `Not Started`, `In Progress` or `Completed`.
    #[arg(long)]
    progress: Option<String>,
    /// `Urgent`, `Important`, `Medium` or `Low`.
    #[arg(long)]
    priority: Option<String>,
    /// Label name (repeatable): Blue, Green, Yellow, Red, Purple, Orange.
    #[arg(long = "label")]
    labels: Vec<String>,
}

/// Parse an RFC 3339 timestamp, or a bare date as midnight UTC.
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{value}': expected RFC 3339 or YYYY-MM-DD"))?;
    match date.and_hms_opt(0, 0, 0) {
        Some(midnight) => Ok(midnight.and_utc()),
        None => bail!("Invalid date '{value}'"),
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_date).transpose()
}

/// Wired-up services for one invocation.
struct App {
    credentials: CredentialProvider,
    api: Arc<dyn PlannerApi>,
}

impl App {
    fn new(settings: &PlanboardSettings) -> Result<Self> {
        let prompt: Arc<dyn DeviceCodePrompt> = Arc::new(|code: &DeviceCode| {
            eprintln!("{}", code.message);
        });
        let identity = MicrosoftIdentity::new(IdentityConfig::from_settings(settings), prompt)
            .context("Failed to initialize sign-in")?;
        let boundary: Arc<dyn IdentityBoundary> = Arc::new(identity);
        let credentials = CredentialProvider::new(boundary, ScopeSet::new(&settings.auth.scopes));

        let api = GraphPlannerApi::from_settings(&settings.graph)
            .context("Failed to build the Planner client")?;
        Ok(Self {
            credentials,
            api: Arc::new(api),
        })
    }

    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login => {
                let account = self.credentials.sign_in().await.map_err(PlannerError::from)?;
                println!("Signed in as {}", account.label());
            }
            Command::Logout => {
                self.credentials.sign_out().await.map_err(PlannerError::from)?;
                println!("Signed out.");
            }
            Command::Status { path, plan } => {
                let account = self.credentials.active_account();
                let plan = plan.map(PlanId::from);
                match &account {
                    Some(account) => {
                        println!("Signed in as {} ({})", account.label(), account.username);
                    }
                    None => println!("Not signed in. Run `planboard login`."),
                }
                match path {
                    Some(path) => {
                        let route = resolve_path(&path, account.as_ref(), plan.as_ref());
                        println!("{path} -> {route}");
                    }
                    None => {
                        let route = resolve_route(account.as_ref(), plan.as_ref());
                        println!("Landing: {route}");
                    }
                }
            }
            Command::Plans => {
                let account = self.credentials.require_account().map_err(PlannerError::from)?;
                let repo = PlanRepository::new(
                    Arc::clone(&self.api),
                    self.credentials.clone(),
                    Arc::new(PlanCache::new()),
                );
                let listing = repo.list_plans(&account).await?;
                print!("{}", render::plans(&listing));
            }
            Command::Dashboard { plan_id } => {
                let account = self.credentials.require_account().map_err(PlannerError::from)?;
                let aggregator = TaskAggregator::new(Arc::clone(&self.api), self.credentials.clone());
                let dashboard = aggregator
                    .load_dashboard(&account, &PlanId::from(plan_id))
                    .await?;
                print!("{}", render::dashboard(&dashboard));
            }
            Command::CreateTask(args) => self.create_task(args).await?,
        }
        Ok(())
    }

    async fn create_task(&self, args: CreateTaskArgs) -> Result<()> {
        let account = self.credentials.require_account().map_err(PlannerError::from)?;
        let writer = TaskWriter::new(Arc::clone(&self.api), self.credentials.clone());
        let plan_id = PlanId::from(args.plan_id);

        let draft = TaskDraft {
            title: args.title,
            start: parse_optional_date(args.start.as_deref())?,
            due: parse_optional_date(args.due.as_deref())?,
            assignees: args.assignees.into_iter().map(UserId::from).collect(),
            progress: args.progress,
            priority: args.priority,
            labels: args.labels,
        };

        let created = match args.bucket {
            Some(bucket) => {
                writer
                    .create_task(&account, &plan_id, Some(&BucketId::from(bucket)), &draft)
                    .await?
            }
            None => {
                writer
                    .create_task_in_default_bucket(&account, &plan_id, &draft)
                    .await?
            }
        };
        println!("Created task {} ({}) in bucket {}", created.title, created.id, created.bucket_id);
        Ok(())
    }
}

fn load_settings(cli: &Cli) -> Result<PlanboardSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(planboard_settings::settings_path);
    let mut settings = planboard_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    Ok(settings)
}

/// Print the user-facing message for a failure; detail goes to the log.
fn report(err: &anyhow::Error) {
    if let Some(planner) = err.downcast_ref::<PlannerError>() {
        tracing::debug!(error = ?planner, "command failed");
        eprintln!("{}", planner.user_message());
    } else {
        eprintln!("Error: {err:#}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    planboard_core::logging::init_subscriber(&settings.logging.level);

    let result = match App::new(&settings) {
        Ok(app) => app.run(cli.command).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
