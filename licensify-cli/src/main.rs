//! Licensify CLI - Command-line interface for the license dashboard
//!
//! Every page command goes through the same route table as the interactive
//! shell, so a role mismatch prints the redirect and shows the landing page.

mod render;
mod settings;
mod shell;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use licensify_app::{
    AppRoute, ApplicationError, CredentialField, Dashboard, DialogAction, MutationOutcome, Page,
    RequestTab, StatusFilter,
};
use licensify_client::{BackendClient, FirebaseIdentityClient};
use licensify_core::{init_logging, LoggingConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

pub(crate) type LiveDashboard = Dashboard<BackendClient, FirebaseIdentityClient>;

#[derive(Parser)]
#[command(name = "licensify")]
#[command(about = "Request, review and track software licenses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password; read from LICENSIFY_PASSWORD or prompted when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the current session
    Whoami,

    /// Open a dashboard path such as /requests
    Open {
        path: String,

        #[arg(long)]
        page: Option<usize>,
    },

    /// Browse the license catalog
    Licenses {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        page: Option<usize>,
    },

    /// Licenses assigned to you
    MyLicenses {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        page: Option<usize>,
    },

    /// Your license requests
    Requests {
        #[arg(short, long)]
        search: Option<String>,

        /// all, pending, accepted or rejected
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        #[arg(long)]
        page: Option<usize>,
    },

    /// Review license requests (admin)
    AdminRequests {
        /// pending or processed
        #[arg(long, default_value = "pending")]
        tab: RequestTab,

        #[arg(long)]
        page: Option<usize>,
    },

    /// Request a license by id or name
    Request {
        license: String,

        /// Optional note for the reviewer
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Accept a pending request (admin)
    Accept {
        request_id: String,

        /// Required reviewer comment
        #[arg(long)]
        comment: String,
    },

    /// Reject a pending request (admin)
    Reject {
        request_id: String,

        /// Required reviewer comment
        #[arg(long)]
        comment: String,
    },

    /// Interactive dashboard shell
    Shell,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Set a configuration value (key=value format)
        #[arg(long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(long)]
        get: Option<String>,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting licensify CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config {
            show,
            init,
            set,
            get,
            reset,
            validate,
        } => settings::handle_config(
            cli.config.as_ref(),
            show,
            init,
            set,
            get,
            reset,
            validate,
        ),
        command => {
            let config = settings::load_config(cli.config.as_ref())?;
            let mut dashboard =
                Dashboard::from_config(config).context("Failed to set up the dashboard")?;
            run_command(&mut dashboard, command).await
        }
    }
}

async fn run_command(dashboard: &mut LiveDashboard, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => handle_login(dashboard, email, password).await?,
        Commands::Logout => {
            dashboard.logout().await?;
            println!("👋 Logged out");
        }
        Commands::Whoami => render::print_session(dashboard.session()),
        Commands::Open { path, page } => open_page(dashboard, &path, None, page).await,
        Commands::Licenses { search, page } => {
            open_page(dashboard, AppRoute::Licenses.path(), search, page).await
        }
        Commands::MyLicenses { search, page } => {
            open_page(dashboard, AppRoute::MyLicenses.path(), search, page).await
        }
        Commands::Requests {
            search,
            status,
            page,
        } => {
            let nav = dashboard.navigate(AppRoute::Requests.path()).await;
            render::print_navigation(&nav);
            if let Page::Requests(view) = dashboard.page_mut() {
                view.set_status_filter(status);
            }
            apply_view_options(dashboard, search, page);
            render::print_page(dashboard.page());
        }
        Commands::AdminRequests { tab, page } => {
            let nav = dashboard.navigate(AppRoute::AdminRequests.path()).await;
            render::print_navigation(&nav);
            if let Page::AdminRequests(view) = dashboard.page_mut() {
                view.set_tab(tab);
            }
            apply_view_options(dashboard, None, page);
            render::print_page(dashboard.page());
        }
        Commands::Request { license, comment } => {
            let nav = dashboard.navigate(AppRoute::Licenses.path()).await;
            if nav.route != AppRoute::Licenses {
                render::print_navigation(&nav);
                anyhow::bail!("Log in to request licenses");
            }
            dashboard.open_request(&license, &comment)?;
            let outcome = dashboard.submit_request().await?;
            render::print_outcome("License request", &outcome);
            exit_on_failure(&outcome);
        }
        Commands::Accept {
            request_id,
            comment,
        } => decide(dashboard, &request_id, DialogAction::Accept, &comment).await?,
        Commands::Reject {
            request_id,
            comment,
        } => decide(dashboard, &request_id, DialogAction::Reject, &comment).await?,
        Commands::Shell => shell::Shell::new(dashboard).run().await?,
        // Handled before the dashboard is built
        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn handle_login(
    dashboard: &mut LiveDashboard,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let password = match password.or_else(|| std::env::var("LICENSIFY_PASSWORD").ok()) {
        Some(password) => password,
        None => prompt("🔑 Password: ")?,
    };

    dashboard.set_credential(CredentialField::Email, &email)?;
    dashboard.set_credential(CredentialField::Password, &password)?;

    match dashboard.login().await {
        Ok(nav) => {
            let session = dashboard.session();
            println!(
                "✅ Logged in as {} ({})",
                session.email,
                session.role.map(|r| r.to_string()).unwrap_or_default()
            );
            render::print_navigation(&nav);
            render::print_page(dashboard.page());
            Ok(())
        }
        Err(e) => {
            report_login_failure(&e);
            std::process::exit(1);
        }
    }
}

pub(crate) fn report_login_failure(error: &ApplicationError) {
    debug!(error = ?error, "Login flow failed");
    eprintln!("❌ Login failed: {}", error.user_message());
}

async fn open_page(
    dashboard: &mut LiveDashboard,
    path: &str,
    search: Option<String>,
    page: Option<usize>,
) {
    let nav = dashboard.navigate(path).await;
    render::print_navigation(&nav);
    apply_view_options(dashboard, search, page);
    render::print_page(dashboard.page());
}

fn apply_view_options(
    dashboard: &mut LiveDashboard,
    search: Option<String>,
    page: Option<usize>,
) {
    let current = dashboard.page_mut();
    if let Some(term) = search {
        if !current.set_search(&term) {
            println!("⚠️  {} has no search", current.route());
        }
    }
    if let Some(number) = page {
        current.go_to_page(number);
    }
}

async fn decide(
    dashboard: &mut LiveDashboard,
    request_id: &str,
    action: DialogAction,
    comment: &str,
) -> Result<()> {
    let nav = dashboard.navigate(AppRoute::AdminRequests.path()).await;
    if nav.redirected {
        render::print_navigation(&nav);
        anyhow::bail!("Only admins can review requests");
    }

    dashboard.open_decision(request_id, action, comment)?;
    let outcome = dashboard.confirm_decision().await?;
    if outcome == MutationOutcome::Skipped {
        anyhow::bail!("A comment is required to {} a request", action);
    }
    render::print_outcome(&format!("Request {}", request_id), &outcome);
    exit_on_failure(&outcome);
    Ok(())
}

fn exit_on_failure(outcome: &MutationOutcome) {
    if matches!(outcome, MutationOutcome::Failed(_)) {
        std::process::exit(1);
    }
}

/// Read one line from stdin after printing `label`
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
