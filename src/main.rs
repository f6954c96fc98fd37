//! DailyToon 命令行
//!
//! 客户端命令通过 HttpEpisodeStore 访问后端；`serve` 启动本地开发后端

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use dailytoon::application::{
    EpisodeStorePort, HydratedEpisode, HydrationController, PanelImageState, PanelOutcome,
    StoreError,
};
use dailytoon::config::{load_config_from_path, print_config, AppConfig};
use dailytoon::domain::{Episode, EpisodeId, PanelId, StorySubmission};
use dailytoon::infrastructure::adapters::{
    HttpEpisodeStore, LocalStoryboarder, PlaceholderArtist,
};
use dailytoon::infrastructure::http::{AppState, HttpServer};
use dailytoon::infrastructure::memory::InMemoryEpisodeRepository;

#[derive(Parser)]
#[command(name = "dailytoon")]
#[command(about = "DailyToon - turn your daily story into a comic episode")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides configuration)
    #[arg(long, global = true)]
    backend: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local development backend
    Serve,

    /// Check whether the backend is reachable
    Health,

    /// Submit a story and create an episode
    Submit {
        /// Story text (read from --file or stdin when omitted)
        story: Option<String>,

        /// Read the story from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Main character name
        #[arg(long)]
        name: Option<String>,

        /// Main character appearance
        #[arg(long)]
        appearance: Option<String>,

        /// Generate panel images right after creation
        #[arg(long)]
        hydrate: bool,
    },

    /// List episodes, newest first
    List,

    /// Show an episode and its panels
    Show {
        episode_id: String,
    },

    /// Delete an episode
    Delete {
        episode_id: String,
    },

    /// Generate images for every panel that has none
    Hydrate {
        episode_id: String,
    },

    /// Retry image generation for a single panel
    Generate {
        episode_id: String,
        panel_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config_from_path(cli.config.as_deref()) {
        Ok(mut config) => {
            if let Some(url) = &cli.backend {
                config.backend.url = url.clone();
            }
            config
        }
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(2);
        }
    };

    init_tracing(&config);

    if let Err(e) = run(cli.command, config).await {
        match e.downcast_ref::<StoreError>() {
            Some(store_error) => {
                tracing::debug!(error = %store_error, kind = ?store_error.kind(), "Request failed");
                eprintln!("{}", store_error.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},dailytoon={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<()> {
    let store: Arc<dyn EpisodeStorePort> =
        Arc::new(HttpEpisodeStore::new(config.backend.store_config())?);

    match command {
        Commands::Serve => return serve(config).await,
        Commands::Health => {
            if store.health_check().await {
                println!("Backend is up ({})", config.backend.url);
            } else {
                println!("Backend is not responding ({})", config.backend.url);
            }
        }
        Commands::Submit {
            story,
            file,
            name,
            appearance,
            hydrate,
        } => {
            let text = read_story(story, file)?;
            let mut submission = StorySubmission::new(text)?;
            if let Some(name) = name {
                submission = submission.with_character_name(name);
            }
            if let Some(appearance) = appearance {
                submission = submission.with_character_appearance(appearance);
            }

            let episode = store.submit_story(submission).await?;
            print_episode(&episode);

            if hydrate {
                hydrate_episode(HydrationController::new(store, episode)).await;
            }
        }
        Commands::List => {
            let episodes = store.list_episodes().await?;
            if episodes.is_empty() {
                println!("No episodes yet.");
            }
            for episode in episodes {
                let illustrated = episode.panels().iter().filter(|p| p.has_image()).count();
                println!(
                    "{}  {}  {}  ({}/{} panels illustrated)",
                    episode.episode_id(),
                    episode.created_date().format("%Y-%m-%d %H:%M"),
                    episode.title(),
                    illustrated,
                    episode.panel_count()
                );
            }
        }
        Commands::Show { episode_id } => {
            let episode = store.get_episode(&EpisodeId::new(episode_id)?).await?;
            print_episode(&episode);
        }
        Commands::Delete { episode_id } => {
            let episode_id = EpisodeId::new(episode_id)?;
            store.delete_episode(&episode_id).await?;
            println!("Deleted episode {}", episode_id);
        }
        Commands::Hydrate { episode_id } => {
            let controller =
                HydrationController::load(store, &EpisodeId::new(episode_id)?).await?;
            hydrate_episode(controller).await;
        }
        Commands::Generate {
            episode_id,
            panel_id,
        } => {
            let controller =
                HydrationController::load(store, &EpisodeId::new(episode_id)?).await?;
            let panel_id = PanelId::new(panel_id)?;

            match controller.retry_panel(&panel_id).await? {
                PanelOutcome::Generated { cached, .. } => {
                    println!(
                        "Panel {} {}",
                        panel_id,
                        if cached { "already had an image" } else { "generated" }
                    );
                }
                PanelOutcome::Failed { error, .. } => return Err(error.into()),
                PanelOutcome::Skipped { state, .. } => {
                    println!("Panel {} skipped ({})", panel_id, state);
                }
            }
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    print_config(&config);

    let state = AppState::new(
        InMemoryEpisodeRepository::new().arc(),
        Arc::new(LocalStoryboarder::new((&config.storyboard).into())),
        Arc::new(PlaceholderArtist::new()),
    );
    HttpServer::new(state)
        .run_with_shutdown(&config.server.addr(), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn read_story(story: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(story) = story {
        return Ok(story);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read story from {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read story from stdin")?;
    Ok(text)
}

fn print_episode(episode: &Episode) {
    println!("{}  {}", episode.episode_id(), episode.title());
    println!("created {}", episode.created_date().format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(profile) = episode.character_profile() {
        println!("character {}", profile);
    }
    for panel in episode.panels() {
        let image = match panel.image_base64() {
            Some(image) => format!("image {} bytes", image.len()),
            None => "no image".to_string(),
        };
        println!(
            "  [{}] {}  {}  ({})",
            panel.order() + 1,
            panel.panel_id(),
            panel.scene_description(),
            image
        );
        if let Some(dialogue) = panel.dialogue() {
            println!("       “{}”", dialogue);
        }
    }
}

fn print_progress(state: &HydratedEpisode) {
    println!(
        "  {} present, {} in progress, {} missing",
        state.count(PanelImageState::Present),
        state.count(PanelImageState::InProgress),
        state.count(PanelImageState::Missing)
    );
}

/// 补全并打印进度；失败分格给出手动重试命令
async fn hydrate_episode(controller: HydrationController) {
    let mut updates = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            print_progress(&state);
        }
    });

    let report = controller.hydrate().await;
    let episode_id = controller.episode_id().clone();
    drop(controller);
    let _ = watcher.await;

    println!("{} panel(s) generated", report.generated().count());
    for (panel_id, error) in report.failed() {
        println!("Panel {}: {}", panel_id, error.user_message());
        println!("  retry with: dailytoon generate {} {}", episode_id, panel_id);
    }
}
