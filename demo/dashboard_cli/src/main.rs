mod cli;
mod config;
mod render;

use clap::Parser;
use cli::{Cli, Command};
use config::DashboardConfig;
use datadash_core::api::UploadFile;
use datadash_core::forms::{LoginForm, RegisterForm};
use datadash_core::views::{
    AssumeYes, CatalogQuery, Confirm, DatasetListView, DeleteOutcome, DetailView, UploadFlow,
};
use datadash_core::{Dashboard, Result};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logging / tracing; stdout is reserved for command output
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "warn,datadash_core=info,dashboard_cli=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration (defaults + env + optional TOML overlay)
    let mut cfg = DashboardConfig::load();
    if let Some(url) = &cli.api_url {
        cfg.client.base_url = url.clone();
    }

    let dashboard = match Dashboard::new(cfg.client.clone()) {
        Ok(d) => d,
        Err(e) => {
            error!(target: "dashboard_cli", error = %e, "Failed to initialize client");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&cli, &cfg, &dashboard).await {
        error!(target: "dashboard_cli", error = %e, "Command failed");
        eprintln!("{}", e.user_message(&e.to_string()));
        std::process::exit(1);
    }
}

fn login_form(cli: &Cli, remember_me: bool) -> LoginForm {
    LoginForm {
        email: cli.email.clone().unwrap_or_default(),
        password: cli.password.clone().unwrap_or_default(),
        remember_me,
    }
}

async fn run(cli: &Cli, cfg: &DashboardConfig, dashboard: &Dashboard) -> Result<()> {
    let store = dashboard.datasets.clone();

    // Sessions live in the client's cookie jar, so every run signs in first
    // when credentials are available.
    let signs_in_itself = matches!(cli.command, Command::Login { .. } | Command::Register(_));
    if !signs_in_itself && cli.email.is_some() && cli.password.is_some() {
        dashboard.session.login(&login_form(cli, false)).await?;
    }

    match &cli.command {
        Command::List(args) => {
            let query = CatalogQuery {
                search: args.search.clone(),
                filter: args.file_type.unwrap_or(cfg.list.file_type),
                sort: args.sort.unwrap_or(cfg.list.sort),
            };
            let view = DatasetListView::new(store, Arc::new(AssumeYes));
            let model = if args.refresh {
                view.retry(&query).await
            } else {
                view.load(&query).await
            };
            render::list(&model);
        }
        Command::Show(args) => {
            let view = DetailView::new(store, args.rows.unwrap_or(cfg.client.preview_limit));
            let detail = view.load(args.id).await?;
            render::detail(&detail);
        }
        Command::Upload(args) => {
            let file = UploadFile::from_path(&args.path).await?;
            let dataset = UploadFlow::new(store).submit(file, render::progress).await?;
            info!(target: "dashboard_cli", id = dataset.id, "Upload accepted");
            println!("Uploaded {} as dataset #{}; processing has started.", dataset.name, dataset.id);
        }
        Command::Delete(args) => {
            // Best effort: lets the prompt name the dataset
            store.fetch_datasets(false).await;
            let confirm: Arc<dyn Confirm> = if args.yes {
                Arc::new(AssumeYes)
            } else {
                Arc::new(render::StdinConfirm)
            };
            match DatasetListView::new(store, confirm).delete(args.id).await? {
                DeleteOutcome::Deleted => println!("Dataset #{} deleted.", args.id),
                DeleteOutcome::Cancelled => println!("Cancelled."),
            }
        }
        Command::Download(args) => {
            let link = DatasetListView::new(store, Arc::new(AssumeYes))
                .download(args.id)
                .await?;
            println!("{}\t{}", link.filename, link.download_url);
        }
        Command::Login { remember_me } => {
            match dashboard.session.login(&login_form(cli, *remember_me)).await? {
                Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
                None => println!("Signed in."),
            }
        }
        Command::Register(args) => {
            let password = cli.password.clone().unwrap_or_default();
            let form = RegisterForm {
                name: args.name.clone(),
                email: cli.email.clone().unwrap_or_default(),
                confirm_password: args.confirm_password.clone().unwrap_or_else(|| password.clone()),
                password,
            };
            dashboard.session.register(&form).await?;
            println!("Account created for {}.", form.email.trim());
        }
        Command::Logout => {
            dashboard.session.logout().await?;
            println!("Signed out.");
        }
        Command::Profile => {
            let profile = dashboard.users.profile().await?;
            render::profile(&profile);
        }
    }
    Ok(())
}
