// SPDX-License-Identifier: AGPL-3.0
// Gallery Term - Terminal frontend

mod commands;
mod render;

use commands::{Command, Flow};
use gallery_core::{AppError, ArtworkGateway, FavoritesStore, GalleryController, SettingsStore};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; stdout belongs to the gallery output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gallery_term=info,gallery_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Gallery v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Gallery exited with an error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let settings_store = SettingsStore::new()?;
    let settings = settings_store.get();
    settings.validate()?;

    let favorites = Arc::new(FavoritesStore::open(&settings_store.database_path()?)?);
    let gateway = Arc::new(ArtworkGateway::new(&settings)?);
    let controller = Arc::new(GalleryController::new(gateway, favorites, &settings));

    watch_favorites(&controller);

    println!("Gallery - type 'help' for commands");
    commands::execute(&controller, Command::Reload).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.parse::<Command>() {
            Ok(command) => {
                if commands::execute(&controller, command).await == Flow::Quit {
                    break;
                }
            }
            Err(message) => println!("{}", message),
        }
    }

    controller.cancel_in_flight();
    tracing::info!("Goodbye");
    Ok(())
}

/// Log every committed change to the favorites database
fn watch_favorites(controller: &Arc<GalleryController>) {
    let favorites = controller.favorites().clone();
    let mut revisions = favorites.subscribe();

    tokio::spawn(async move {
        while revisions.changed().await.is_ok() {
            match favorites.count() {
                Ok(count) => tracing::debug!("Favorites changed, {} saved", count),
                Err(e) => tracing::warn!("Favorites changed but could not be counted: {}", e),
            }
        }
    });
}
