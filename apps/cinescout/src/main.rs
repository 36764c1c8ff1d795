use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    api_for_page, load_settings,
    pages::{browse_page, movie_page, saved_list_page},
    CriterionTableLoader, Document, ListToggleController, ReviewFetcher, SavedListController,
    Settings,
};
use shared::domain::{FilmRef, ListMembership, TmdbId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cinescout", about = "Drive the Cinescout page scripts against a server")]
struct Cli {
    /// Config file; defaults to ./cinescout.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    /// Token the rendered page would carry in its csrf-token meta tag.
    #[arg(long)]
    csrf_token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and render the Criterion catalog table.
    Browse,
    /// Fetch the NYT review for a film.
    Review {
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 0)]
        year: i32,
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long)]
        original_title: Option<String>,
    },
    /// Add a film to the saved list from its movie page.
    Add {
        #[arg(long)]
        tmdb_id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 0)]
        year: i32,
    },
    /// Remove a film from the saved-list page.
    Remove {
        #[arg(long)]
        tmdb_id: String,
        #[arg(long)]
        title: Option<String>,
    },
}

fn film(tmdb_id: &str, title: String, year: i32, date: String, original_title: Option<String>) -> FilmRef {
    FilmRef {
        tmdb_id: TmdbId::new(tmdb_id),
        original_title: original_title.unwrap_or_else(|| title.clone()),
        title,
        year,
        release_date: date,
    }
}

fn print_page(doc: &mut Document) {
    for alert in doc.take_alerts() {
        eprintln!("alert: {alert}");
    }
    println!("{}", doc.to_html(doc.root()));
}

async fn run(settings: Settings, command: Command) -> Result<()> {
    let csrf = settings.csrf_token.clone();

    match command {
        Command::Browse => {
            let mut doc = browse_page();
            let api = api_for_page(&settings, &doc)?;
            let outcome = CriterionTableLoader::new(api, settings.table_spinner_delay)
                .load(&mut doc)
                .await;
            print_page(&mut doc);
            outcome.context("catalog load failed")?;
        }
        Command::Review {
            title,
            year,
            date,
            original_title,
        } => {
            let film = film("", title, year, date, original_title);
            let mut doc = movie_page(&film, csrf.as_deref(), None);
            let api = api_for_page(&settings, &doc)?;
            let outcome = ReviewFetcher::new(api).fetch(&mut doc).await;
            print_page(&mut doc);
            outcome.context("review lookup failed")?;
        }
        Command::Add {
            tmdb_id,
            title,
            year,
        } => {
            let film = film(&tmdb_id, title, year, String::new(), None);
            let mut doc = movie_page(&film, csrf.as_deref(), Some(ListMembership::NotOnList));
            let api = api_for_page(&settings, &doc)?;
            let mut toggle = ListToggleController::attach(&doc, api)?
                .context("movie page rendered without a list button")?;
            let outcome = toggle.toggle(&mut doc).await;
            print_page(&mut doc);
            let state = outcome.context("add to list failed")?;
            info!(tmdb_id = %film.tmdb_id, ?state, "done");
        }
        Command::Remove { tmdb_id, title } => {
            let tmdb_id = TmdbId::new(tmdb_id);
            let title = title.unwrap_or_else(|| tmdb_id.to_string());
            let mut doc = saved_list_page(&[(tmdb_id.clone(), title)], csrf.as_deref());
            let api = api_for_page(&settings, &doc)?;
            let list = SavedListController::attach(&mut doc, api);
            let outcome = list.remove(&mut doc, &tmdb_id).await;
            print_page(&mut doc);
            outcome.context("remove from list failed")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(token) = cli.csrf_token {
        settings.csrf_token = Some(token);
    }
    info!(base_url = %settings.base_url, "cinescout starting");

    run(settings, cli.command).await
}
