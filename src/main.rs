use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stride::cli::{
    handle_goal_command, handle_milestone_command, handle_reminder_command,
    handle_transaction_command, CommandContext, GoalCommands, MilestoneCommands, ReminderCommands,
    TransactionCommands,
};
use stride::clock::SystemClock;
use stride::config::{paths::StridePaths, settings::Settings};
use stride::models::UserId;
use stride::storage::Storage;

#[derive(Parser)]
#[command(
    name = "stride",
    version,
    about = "Track financial goals from the command line",
    long_about = "Stride tracks savings, debt payoff and other financial goals. \
                  Record progress by hand or derive it from your income and \
                  expense history, set milestones, and see which goals need \
                  attention before their deadlines slip."
)]
struct Cli {
    /// Act as this user (defaults to the configured user)
    #[arg(short, long, global = true, env = "STRIDE_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Goal management commands
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Milestone management commands
    #[command(subcommand)]
    Milestone(MilestoneCommands),

    /// Reminder commands
    #[command(subcommand)]
    Reminder(ReminderCommands),

    /// Income/expense history used by auto-tracked goals
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Initialize Stride's data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = StridePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let clock = SystemClock;
    let user = UserId::new(cli.user.unwrap_or_else(|| settings.default_user.clone()));
    let ctx = CommandContext {
        storage: &storage,
        settings: &settings,
        clock: &clock,
        user,
    };

    match cli.command {
        Some(Commands::Goal(cmd)) => handle_goal_command(&ctx, cmd)?,
        Some(Commands::Milestone(cmd)) => handle_milestone_command(&ctx, cmd)?,
        Some(Commands::Reminder(cmd)) => handle_reminder_command(&ctx, cmd)?,
        Some(Commands::Transaction(cmd)) => handle_transaction_command(&ctx, cmd)?,
        Some(Commands::Init) => {
            println!("Initializing Stride at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            storage.save_all()?;
            println!("Initialization complete!");
            println!();
            println!("Run 'stride goal create --help' to set your first goal.");
        }
        Some(Commands::Config) => {
            println!("Stride Configuration");
            println!("====================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Default user: {}", settings.default_user);
            println!(
                "  Currency:     {} ({})",
                settings.currency_code, settings.currency_symbol
            );
            println!("  Page size:    {}", settings.page_size);
            println!("  Initialized:  {}", storage.is_initialized());
        }
        None => {
            println!("Stride - financial goal tracking");
            println!();
            println!("Run 'stride --help' for usage information.");
        }
    }

    Ok(())
}
