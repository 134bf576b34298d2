use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;

use curator::api::{CollectionsClient, CompanyStatus};
use curator::browser::{update, Msg, State};
use curator::command::Runtime;
use curator::config::BrowserConfig;

/// Browse collections of companies from the command line.
#[derive(Parser)]
#[command(name = "curator-cli", version, about)]
struct Cli {
    /// Base URL of the collections service
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// TOML file overriding the operational parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Collection to open, by id or name (defaults to the first one)
    #[arg(long)]
    collection: Option<String>,

    /// Filter the company list by name
    #[arg(long, default_value = "")]
    search: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BrowserConfig::load(path)?,
        None => BrowserConfig::default(),
    };
    let api = Arc::new(CollectionsClient::new(&cli.base_url)?);

    let (mut state, init) = State::new(api, config);
    state.list.search = cli.search.clone();

    let (mut runtime, mut rx) = Runtime::new();
    runtime.run(init);

    // Drive the update loop until every effect has settled. With no transfer
    // in flight this is just the collections fetch plus one page load.
    let mut wanted = cli.collection.clone();
    loop {
        let msg = match rx.try_recv() {
            Ok(msg) => msg,
            Err(TryRecvError::Empty) => {
                if !runtime.has_pending() {
                    break;
                }
                match rx.recv().await {
                    Some(msg) => msg,
                    None => break,
                }
            }
            Err(TryRecvError::Disconnected) => break,
        };
        let follow_up = update(&mut state, msg);
        runtime.run(follow_up);

        if !state.collections_loading {
            if let Some(name) = wanted.take() {
                match resolve_collection(&state, &name) {
                    Some(id) => {
                        let cmd = update(&mut state, Msg::CollectionSelected(id));
                        runtime.run(cmd);
                    }
                    None => log::warn!("unknown collection {:?}, showing the first one", name),
                }
            }
        }
    }

    render(&state);
    runtime.shutdown();
    state.dispose();
    Ok(())
}

fn resolve_collection(state: &State, name: &str) -> Option<String> {
    state
        .registry
        .collections()
        .iter()
        .find(|c| c.id == name || c.collection_name.eq_ignore_ascii_case(name))
        .map(|c| c.id.clone())
}

fn render(state: &State) {
    for note in state.notifications.iter() {
        let title = match note.level {
            curator::browser::NotificationLevel::Error => note.title.red().bold(),
            curator::browser::NotificationLevel::Success => note.title.green().bold(),
            curator::browser::NotificationLevel::Info => note.title.normal(),
        };
        println!("{} {}", title, note.detail.dimmed());
    }

    if state.registry.is_empty() {
        println!("{}", "No collections available.".yellow());
        return;
    }

    println!("{}", "Collections".bold());
    for collection in state.registry.collections() {
        let marker = if state
            .registry
            .selected()
            .is_some_and(|s| s.id == collection.id)
        {
            "*"
        } else {
            " "
        };
        println!(
            "{} {} ({})",
            marker,
            collection.collection_name,
            collection.total
        );
    }

    println!();
    if let Some(error) = &state.list.error {
        println!("{}", error.red());
        return;
    }

    for company in &state.list.companies {
        let name = match company.status {
            CompanyStatus::Liked => company.company_name.green(),
            CompanyStatus::Ignore => company.company_name.dimmed(),
            CompanyStatus::New => company.company_name.normal(),
        };
        println!("{:>8}  {}", company.id, name);
    }
    println!(
        "{}",
        format!(
            "Showing {} of {}{}",
            state.list.companies.len(),
            state.list.total,
            if state.list.has_more { " (more available)" } else { "" }
        )
        .dimmed()
    );
}
