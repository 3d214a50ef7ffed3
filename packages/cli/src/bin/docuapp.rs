use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use docuapp_api::DbState;
use docuapp_cli::{init_tracing, run_server, seed_sample_data, Config};
use docuapp_core::{truncate_with_ellipsis, WeekRange};
use docuapp_journal::ItemStatus;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "docuapp")]
#[command(about = "DocuApp - document generation and weekly team journals")]
#[command(version)]
struct Cli {
    /// SQLite database file (defaults to ~/.docuapp/docuapp.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long, help = "Address to bind (overrides HOST)")]
        host: Option<IpAddr>,
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
    },
    /// Create an admin account, or promote an existing user
    CreateAdmin {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Also grant superuser rights
        #[arg(long)]
        superuser: bool,
    },
    /// Load sample departments, users, journals, and document settings
    Seed,
    /// Print the top-management summary for a week
    WeeklySummary {
        /// Week to report on; any date inside it works (defaults to this week)
        #[arg(long)]
        week_start: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match handle_command(cli.command, cli.database).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

async fn handle_command(
    command: Commands,
    database: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve { host, port } => {
            let mut config = Config::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if database.is_some() {
                config.database_path = database;
            }

            println!(
                "{} http://{}",
                "Starting DocuApp server on".green().bold(),
                config.socket_addr()
            );
            run_server(config).await
        }
        Commands::CreateAdmin {
            username,
            email,
            password,
            superuser,
        } => {
            let db = open_database(database).await?;
            let user = db
                .user_storage
                .ensure_admin(&username, &email, &password, superuser)
                .await?;

            let role = if user.is_superuser { "superuser" } else { "staff" };
            println!(
                "{} {} ({})",
                "Admin ready:".green().bold(),
                user.username.cyan(),
                role
            );
            Ok(())
        }
        Commands::Seed => {
            let db = open_database(database).await?;
            let report = seed_sample_data(&db, Local::now().date_naive()).await?;

            println!("{}", "Sample data loaded".green().bold());
            println!("  Departments created: {}", report.departments_created);
            println!("  Users created:       {}", report.users_created);
            println!("  Journals created:    {}", report.journals_created);
            println!(
                "  Document settings:   {}",
                if report.catalog_created { "created" } else { "already present" }
            );
            println!(
                "  Weekly report:       {}",
                if report.report_created { "created" } else { "already present" }
            );
            println!(
                "{}",
                format!(
                    "Sample accounts use the password \"{}\"; change it before real use.",
                    docuapp_cli::seed::SAMPLE_PASSWORD
                )
                .yellow()
            );
            Ok(())
        }
        Commands::WeeklySummary { week_start } => {
            let db = open_database(database).await?;
            let week = WeekRange::containing(week_start.unwrap_or_else(|| Local::now().date_naive()));
            print_weekly_summary(&db, week).await
        }
    }
}

async fn open_database(database: Option<PathBuf>) -> Result<DbState, Box<dyn std::error::Error>> {
    let database = database.or_else(|| {
        std::env::var("DOCUAPP_DATABASE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    });
    Ok(DbState::init_with_path(database).await?)
}

async fn print_weekly_summary(
    db: &DbState,
    week: WeekRange,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = db
        .topman_storage
        .weekly_summary(Some(week.start), Some(week.end))
        .await?;

    println!(
        "{}",
        format!("Weekly Summary - {}", summary.week.label()).blue().bold()
    );
    if let Some(report) = &summary.report {
        println!("Report: {} ({} tagged)", report.title.cyan(), report.tagged_count);
    }
    println!();

    if summary.journal_entries.is_empty() {
        println!("{}", "No journal entries for this week".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Author", "Department", "Dates", "Items", "Completed", "Top highlight"]);

    for journal in &summary.journal_entries {
        let status = journal.status_summary();
        let top_highlight = journal
            .highlights
            .first()
            .map(|item| truncate_with_ellipsis(&item.text, 40))
            .unwrap_or_default();

        table.add_row(vec![
            journal.author.display_name(),
            journal.department.name.clone(),
            format!("{} to {}", journal.date_from, journal.date_to),
            status.total_items.to_string(),
            status.count(ItemStatus::Completed).to_string(),
            top_highlight,
        ]);
    }

    println!("{}", table);

    let stats = &summary.stats;
    println!(
        "Entries: {}  Departments: {}  Team members: {}  Tagged items: {}",
        stats.total_entries.to_string().cyan(),
        stats.total_departments.to_string().cyan(),
        stats.total_team_members.to_string().cyan(),
        stats.tagged_items_count.to_string().cyan()
    );

    let statuses: Vec<String> = ItemStatus::ALL
        .iter()
        .map(|status| format!("{}: {}", status.label(), summary.status_summary.count(*status)))
        .collect();
    println!("{}", statuses.join("  ").dimmed());

    Ok(())
}
