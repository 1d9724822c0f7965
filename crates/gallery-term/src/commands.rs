// SPDX-License-Identifier: AGPL-3.0
// Gallery Term - Command parsing and dispatch

use crate::render;
use gallery_core::{AppError, GalleryController, LoadOutcome};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const HELP: &str = "\
Commands:
  search <text>   search the catalog (blank reloads the default artworks)
  reload          reload the default artworks
  page <n>        browse page n of the catalog
  next, prev      move through the current list
  show            show the current artwork
  dept [name]     filter by department (no name clears the filter)
  depts           list departments in the current list
  fav             save or unsave the current artwork
  favs            list saved artworks
  unfav <n>       remove saved artwork number n
  cancel          cancel the running load
  help, quit";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Reload,
    Page(u32),
    Next,
    Previous,
    Show,
    Department(Option<String>),
    Departments,
    ToggleFavorite,
    Favorites,
    RemoveFavorite(usize),
    Cancel,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "search" | "s" => Command::Search(rest.to_string()),
            "reload" => Command::Reload,
            "page" => Command::Page(parse_number(rest)?),
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Previous,
            "show" | "" => Command::Show,
            "dept" => Command::Department((!rest.is_empty()).then(|| rest.to_string())),
            "depts" => Command::Departments,
            "fav" => Command::ToggleFavorite,
            "favs" => Command::Favorites,
            "unfav" => Command::RemoveFavorite(parse_number(rest)? as usize),
            "cancel" => Command::Cancel,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };
        Ok(command)
    }
}

fn parse_number(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("Expected a number starting at 1, got '{}'", raw)),
    }
}

/// Whether the input loop should keep going
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one command and print its result
pub async fn execute(controller: &Arc<GalleryController>, command: Command) -> Flow {
    match command {
        Command::Search(query) => {
            let handle = controller.spawn_search(query);
            finish_load(controller, handle).await;
        }
        Command::Reload => {
            let handle = controller.spawn_seed_load();
            finish_load(controller, handle).await;
        }
        Command::Page(page) => {
            let result = controller.browse_page(page).await;
            report_load(controller, result);
        }
        Command::Next => {
            controller.advance();
            show_current(controller);
        }
        Command::Previous => {
            controller.retreat();
            show_current(controller);
        }
        Command::Show => show_current(controller),
        Command::Department(department) => {
            controller.set_department_filter(department);
            show_current(controller);
        }
        Command::Departments => {
            let departments = controller.departments();
            if departments.is_empty() {
                println!("No departments in the current list");
            }
            for department in departments {
                println!("  {}", department);
            }
        }
        Command::ToggleFavorite => match controller.current_artwork() {
            Some(artwork) => match controller.toggle_favorite(&artwork) {
                Ok(true) => println!("Saved '{}'", artwork.title),
                Ok(false) => println!("Removed '{}'", artwork.title),
                Err(e) => println!("Could not update favorites: {}", e),
            },
            None => println!("Nothing to save"),
        },
        Command::Favorites => match controller.list_favorites() {
            Ok(saved) => println!("{}", render::favorites_list(&saved)),
            Err(e) => println!("Could not read favorites: {}", e),
        },
        Command::RemoveFavorite(number) => remove_favorite(controller, number),
        Command::Cancel => {
            controller.cancel_in_flight();
            println!("Cancelled");
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

async fn finish_load(
    controller: &GalleryController,
    handle: JoinHandle<Result<LoadOutcome, AppError>>,
) {
    match handle.await {
        Ok(result) => report_load(controller, result),
        Err(e) if e.is_cancelled() => tracing::debug!("Load cancelled"),
        Err(e) => tracing::error!("Load task failed: {}", e),
    }
}

fn report_load(controller: &GalleryController, result: Result<LoadOutcome, AppError>) {
    match result {
        Ok(LoadOutcome::Superseded) => {}
        Ok(LoadOutcome::Loaded(_)) => show_current(controller),
        Ok(LoadOutcome::Partial { .. }) => {
            if let Some(line) = render::status_line(&controller.status()) {
                println!("{}", line);
            }
            show_current(controller);
        }
        Ok(LoadOutcome::NoResults) | Err(_) => {
            if let Some(line) = render::status_line(&controller.status()) {
                println!("{}", line);
            }
        }
    }
}

fn show_current(controller: &GalleryController) {
    match controller.current_artwork() {
        Some(artwork) => {
            let card = render::artwork_card(
                &artwork,
                controller.position(),
                controller.current_image_url().as_deref(),
                controller.is_favorite(&artwork),
            );
            println!("{}", card);
        }
        None => println!(
            "{}",
            render::status_line(&controller.status())
                .unwrap_or_else(|| "No artworks found".to_string())
        ),
    }
}

fn remove_favorite(controller: &GalleryController, number: usize) {
    let saved = match controller.list_favorites() {
        Ok(saved) => saved,
        Err(e) => {
            println!("Could not read favorites: {}", e);
            return;
        }
    };

    match saved.get(number - 1) {
        Some(artwork) => match controller.remove_saved(&artwork.id) {
            Ok(true) => println!("Removed '{}'", artwork.title),
            Ok(false) => println!("'{}' was already removed", artwork.title),
            Err(e) => println!("Could not remove favorite: {}", e),
        },
        None => println!("No saved artwork number {}", number),
    }
}
