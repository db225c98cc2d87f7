use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use makub_core::config::Config;
use makub_core::fetch::{CoordinatorOptions, FilterSet};
use makub_core::logging::init_tracing;
use makub_core::screens::{GameInfoScreen, GameViewModel, GamesScreen, NewsScreen};
use makub_core::service::ScriptedService;
use makub_core::state::StateController;

#[derive(Parser, Debug)]
#[command(
    name = "makub-sim",
    version,
    about = "Run screen fetch cycles against a scripted service"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the news feed together with the current user
    News {
        /// Refresh the feed after the first load
        #[arg(long)]
        refresh: bool,
        /// Delete a news entry after loading
        #[arg(long, value_name = "ID")]
        delete: Option<u64>,
    },
    /// Load the details of one game
    Game {
        /// Game id
        id: String,
    },
    /// Load the games list
    Games {
        /// Number of additional pages to load
        #[arg(long, default_value_t = 0)]
        more: usize,
        /// Keep only games whose attribute matches (repeatable)
        #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

fn print_states(controller: &StateController) {
    controller.observe(|state| println!("state: {}", state));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let options = CoordinatorOptions::from(&config.coordinator);
    let service = Arc::new(ScriptedService::demo().configured(&config.simulation));

    match cli.command {
        Command::News { refresh, delete } => {
            let mut screen = NewsScreen::new(service.clone(), service.clone(), options);
            print_states(screen.controller());

            screen.obtain_news_with_user().await?;
            if refresh {
                screen.refresh_news_with_user().await?;
            }
            if let Some(id) = delete {
                screen.delete_news(id).await?;
            }

            if let Some(user) = screen.user() {
                println!("user: {}", user.full_name);
            }
            for news in screen.news() {
                println!("news {}: {}", news.id, news.title);
            }
        }
        Command::Game { id } => {
            let Some(game) = service
                .games()
                .iter()
                .find(|game| game.id == id)
                .cloned()
                .map(GameViewModel::from)
            else {
                bail!("Game '{}' not found", id);
            };

            let mut screen = GameInfoScreen::new(game, service.clone(), service.clone(), options);
            print_states(screen.controller());
            screen.obtain_game().await?;

            match screen.details() {
                Ok(details) => {
                    println!(
                        "game {}: {} vs {} ({})",
                        details.game.id,
                        details.game.player1,
                        details.game.player2,
                        details.tournament.title
                    );
                    for comment in details.comments {
                        println!("comment by {}: {}", comment.author, comment.text);
                    }
                }
                Err(err) => println!("details unavailable: {}", err),
            }
        }
        Command::Games { more, filters } => {
            let mut screen = GamesScreen::new(service.clone(), options, &config.pagination)?;
            print_states(screen.controller());

            if filters.is_empty() {
                screen.obtain_games().await?;
                for _ in 0..more {
                    screen.obtain_more_games().await?;
                }
            } else {
                let filters: FilterSet = filters
                    .into_iter()
                    .map(|(key, value)| (key, [value]))
                    .collect();
                screen.obtain_all_games(filters).await?;
            }

            let window = screen.window();
            println!("window: {}..={}", window.from, window.to);
            for game in screen.games() {
                println!(
                    "game {} [{}] {} vs {}",
                    game.id, game.game_type, game.player1, game.player2
                );
            }
        }
    }

    Ok(())
}
