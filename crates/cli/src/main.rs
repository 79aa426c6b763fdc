use clap::{Parser, Subcommand};
use filing_client::ApiClient;
use filing_core::records::{Filing, PageQuery};
use filing_core::{
    extract_status_change_info, extract_user_remark, format_remark_for_display, has_user_remark,
    status_options, DisplayMode, FileSessionStore, FilingConfig, NavigationGuard, PolicyOutcome,
    SessionContext, TemplateStatus,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "filing")]
#[command(about = "Large-model filing system CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a remark string
    Remark {
        #[command(subcommand)]
        action: RemarkAction,
    },
    /// List the application statuses
    Statuses,
    /// Show where a page path leads for the current session
    Route {
        /// Page path, e.g. /admin/task-board
        path: String,
    },
    /// Log in and store the session
    Login {
        login_name: String,
        password: String,
        /// Use the administrator login
        #[arg(long)]
        admin: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami {
        /// Also ask the server whether the login is still valid
        #[arg(long)]
        check: bool,
    },
    /// List templates
    Templates {
        /// Only templates visible without administrator rights
        #[arg(long)]
        public: bool,
        /// Filter by template name
        #[arg(long)]
        name: Option<String>,
        /// Filter by template type
        #[arg(long = "type")]
        template_type: Option<String>,
    },
    /// List the distinct template types
    TemplateTypes,
    /// List applications
    Applications {
        /// Status code filter
        #[arg(long)]
        status: Option<i32>,
        /// Remark display mode: user, system or full
        #[arg(long, default_value = "user")]
        mode: DisplayMode,
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
    /// Apply for a template, or send it to users as an administrator
    Apply {
        template_id: String,
        /// Target user id (repeatable)
        #[arg(long = "user")]
        users: Vec<String>,
    },
    /// Print the filled-in content of an application
    Content { id: String },
    /// Save form content (JSON) for an application
    Save { id: String, content: String },
    /// Submit filled content for review
    Submit { id: String },
    /// Set the status of an application as a reviewer
    Review {
        id: String,
        /// Target status code
        status: i32,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Show dashboard counters
    Statistics,
    /// Download the generated filing document
    Download {
        id: String,
        /// Target file or directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// List filing records
    Filings {
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
}

#[derive(Subcommand)]
enum RemarkAction {
    /// Print both parts of a remark
    Split { remark: String },
    /// Print a remark as a given audience sees it
    Format {
        remark: String,
        #[arg(long, default_value = "user")]
        mode: DisplayMode,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("filing=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'filing --help' for commands");
        return Ok(());
    };

    // Commands that need neither configuration nor a session.
    match command {
        Commands::Remark { action } => {
            run_remark(action);
            return Ok(());
        }
        Commands::Statuses => {
            for option in status_options() {
                println!("{}\t{}", option.value, option.label);
            }
            return Ok(());
        }
        command => run_remote(command).await,
    }
}

fn run_remark(action: RemarkAction) {
    match action {
        RemarkAction::Split { remark } => {
            println!("status change: {}", extract_status_change_info(remark.as_str()));
            println!("user remark:   {}", extract_user_remark(remark.as_str()));
            println!("has remark:    {}", has_user_remark(remark.as_str()));
        }
        RemarkAction::Format { remark, mode } => {
            println!("{}", format_remark_for_display(remark.as_str(), mode));
        }
    }
}

fn load_config() -> anyhow::Result<FilingConfig> {
    Ok(FilingConfig::from_values(
        std::env::var("FILING_API_BASE_URL").ok(),
        std::env::var("FILING_API_TIMEOUT_MS").ok(),
        std::env::var("FILING_SESSION_FILE").ok(),
        std::env::var_os("HOME").map(PathBuf::from),
    )?)
}

async fn run_remote(command: Commands) -> anyhow::Result<()> {
    let config = load_config()?;
    let session = Arc::new(SessionContext::load(FileSessionStore::new(
        config.session_file(),
    ))?);
    let client = ApiClient::from_config(&config, session.clone())?;
    tracing::debug!(
        "using API at {} (session file {})",
        client.base_url(),
        config.session_file().display()
    );

    match command {
        Commands::Route { path } => {
            let current = session.current();
            let nav = NavigationGuard::default().evaluate(&path, current.as_ref());
            println!("{} ({})", nav.title, nav.route_name);
            match nav.outcome {
                PolicyOutcome::Proceed => println!("-> {}", path),
                PolicyOutcome::Redirect(target) => println!("-> redirected to {}", target),
            }
        }
        Commands::Login {
            login_name,
            password,
            admin,
        } => {
            let auth = client.auth();
            let established = if admin {
                auth.admin_login(&login_name, &password).await?
            } else {
                auth.login(&login_name, &password).await?
            };
            println!(
                "Logged in as {} ({})",
                established.user_name.as_deref().unwrap_or(&login_name),
                established.role
            );
        }
        Commands::Logout => {
            println!("{}", client.auth().logout()?);
        }
        Commands::Whoami { check } => match session.current() {
            Some(current) => {
                println!(
                    "{} ({}) since {}",
                    current.user_name.as_deref().unwrap_or("-"),
                    current.role,
                    current.established_at.format("%Y-%m-%d %H:%M:%S")
                );
                if check {
                    let valid = client.auth().check_session().await;
                    println!("session valid: {}", valid);
                }
            }
            None => println!("Not logged in."),
        },
        Commands::Templates {
            public,
            name,
            template_type,
        } => {
            let query = PageQuery {
                template_name: name,
                template_type,
                page_size: Some(100),
                ..PageQuery::default()
            };
            let page = if public {
                client.templates().public(&query).await?
            } else {
                client.templates().list(&query).await?
            };
            if page.content.is_empty() {
                println!("No templates found.");
            }
            for template in page.content {
                println!(
                    "ID: {}, Code: {}, Name: {}, Type: {}",
                    template.id,
                    template.template_code.as_deref().unwrap_or("-"),
                    template.template_name.as_deref().unwrap_or("-"),
                    template.template_type.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::TemplateTypes => {
            for template_type in client.templates().types().await? {
                println!("{}", template_type);
            }
        }
        Commands::Applications { status, mode, page } => {
            let query = PageQuery {
                page_num: Some(page),
                status,
                ..PageQuery::default()
            };
            let result = client.user_templates().page(&query).await?;
            println!(
                "Page {} of {} ({} applications)",
                result.number + 1,
                result.total_pages.max(1),
                result.total_elements
            );
            for item in &result.content {
                println!(
                    "ID: {}, Template: {}, Status: {}, Remark: {}",
                    item.id,
                    item.template_name.as_deref().unwrap_or("-"),
                    item.status_label(),
                    item.remark_for_display(mode)
                );
            }
        }
        Commands::Apply { template_id, users } => {
            let ids = client.user_templates().apply(&template_id, &users).await?;
            for id in ids {
                println!("Created application {}", id);
            }
        }
        Commands::Content { id } => {
            println!("{}", client.user_templates().content(&id).await?);
        }
        Commands::Save { id, content } => {
            let value: serde_json::Value = serde_json::from_str(&content)?;
            client.user_templates().save_content(&id, &value).await?;
            println!("Saved content for {}", id);
        }
        Commands::Submit { id } => {
            client.user_templates().submit_for_review(&id).await?;
            println!("Submitted {} for review", id);
        }
        Commands::Review {
            id,
            status,
            remarks,
        } => {
            let status = TemplateStatus::from_code(status)?;
            client
                .user_templates()
                .review(&id, status, remarks.as_deref())
                .await?;
            println!("{} is now {}", id, status);
        }
        Commands::Statistics => {
            let stats = client.user_templates().statistics().await?;
            println!("Templates:        {}", stats.total_templates);
            println!("Pending approval: {}", stats.pending_count);
            println!("Under review:     {}", stats.in_progress_count);
            println!("Approved:         {}", stats.approved_count);
            println!("Total tasks:      {}", stats.total_tasks);
        }
        Commands::Download { id, out } => {
            let written = client.files().save_download(&id, &out).await?;
            println!("Saved {}", written.display());
        }
        Commands::Filings { page } => {
            let result = client.filings().list(&PageQuery::page(page, 10)).await?;
            if result.content.is_empty() {
                println!("No filings found.");
            }
            for Filing {
                id, title, status, ..
            } in result.content
            {
                println!(
                    "ID: {}, Title: {}, Status: {}",
                    id.as_deref().unwrap_or("-"),
                    title.as_deref().unwrap_or("-"),
                    filing_core::status_description(status)
                );
            }
        }
        Commands::Remark { .. } | Commands::Statuses => {}
    }

    Ok(())
}
