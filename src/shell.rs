//! # Shell Adapter
//!
//! A line-oriented terminal front end. Reads one command per line, turns it
//! into a core [`Action`], runs the returned [`Effect`], and prints the screen
//! for the current route.
//!
//! ```text
//! stdin line ─► parse_command ─► Action ─► update() ─► Effect ─► perform ─► render
//! ```
//!
//! This is the only module that prints.

use std::io::{self, Write};

use futures::future::join_all;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::catalog::SectionType;
use crate::core::action::{Action, Effect, update};
use crate::core::state::{App, Route};
use crate::paging::{LoadState, PagingSnapshot};

/// Items shown per section on the detail screen.
const DETAIL_PREVIEW: usize = 3;

const HELP: &str = "\
commands:
  <enter>          redraw
  n                load more rows
  r                refresh
  o <number>       open a character
  s <section>      open comics | series | stories | events
  m <section>      load more of a section (detail screen)
  b                back
  / <query>        search
  h                help
  q                quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Help,
    Next,
    Refresh,
    Open(usize),
    Section(SectionType),
    More(SectionType),
    Back,
    Search(String),
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        return Command::Search(query.trim().to_string());
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let section = || SectionType::parse(rest);
    match (head, rest.is_empty()) {
        ("", _) => Command::Show,
        ("h" | "help" | "?", true) => Command::Help,
        ("n" | "next", true) => Command::Next,
        ("r" | "refresh", true) => Command::Refresh,
        ("b" | "back", true) => Command::Back,
        ("q" | "quit", true) => Command::Quit,
        ("o" | "open", false) => rest
            .parse()
            .map(Command::Open)
            .unwrap_or_else(|_| Command::Unknown(line.to_string())),
        ("s" | "section", false) => section()
            .map(Command::Section)
            .unwrap_or_else(|| Command::Unknown(line.to_string())),
        ("m" | "more", false) => section()
            .map(Command::More)
            .unwrap_or_else(|| Command::Unknown(line.to_string())),
        _ => Command::Unknown(line.to_string()),
    }
}

/// Resolves a command against the current screen. `Ok(None)` is a redraw.
pub fn to_action(app: &App, command: Command) -> Result<Option<Action>, String> {
    let action = match command {
        Command::Show | Command::Help => return Ok(None),
        Command::Next => Action::LoadMore,
        Command::Refresh => Action::Refresh,
        Command::Back => Action::Back,
        Command::Quit => Action::Quit,
        Command::Search(query) => Action::Search(query),
        Command::Section(kind) => Action::OpenSection(kind),
        Command::More(kind) => Action::LoadMoreSection(kind),
        Command::Open(index) => {
            if app.route != Route::Home {
                return Err("go back to the character list first".to_string());
            }
            let snapshot = app.characters.snapshot();
            let character = snapshot
                .items()
                .nth(index)
                .cloned()
                .ok_or_else(|| format!("no character #{index}"))?;
            app.characters.set_anchor(index);
            Action::OpenCharacter(character)
        }
        Command::Unknown(input) => return Err(format!("unknown command '{input}', h for help")),
    };
    Ok(Some(action))
}

/// Runs the network work an effect describes and waits for it.
pub async fn perform(app: &App, effect: Effect) {
    debug!("Effect: {:?}", effect);
    match effect {
        Effect::None | Effect::Quit => {}
        Effect::RefreshCharacters => {
            app.characters.refresh().await;
        }
        Effect::LoadMoreCharacters => {
            app.characters.load_next().await;
        }
        Effect::RefreshDetail => {
            let pagers: Vec<_> = SectionType::ALL
                .into_iter()
                .filter_map(|kind| app.detail.current(kind))
                .collect();
            join_all(pagers.iter().map(|p| p.refresh())).await;
        }
        Effect::LoadMoreSection(kind) => {
            if let Some(pager) = app.detail.current(kind) {
                pager.load_next().await;
            }
        }
        Effect::RefreshSectionView => {
            if let Some(pager) = app.section_view.current() {
                pager.refresh().await;
            }
        }
        Effect::LoadMoreSectionView => {
            if let Some(pager) = app.section_view.current() {
                pager.load_next().await;
            }
        }
    }
}

/// Waits until everything on the current screen has finished loading.
pub async fn settle(app: &App) {
    match app.route {
        Route::Home => {
            app.characters.settled().await;
        }
        Route::Detail => {
            let pagers: Vec<_> = SectionType::ALL
                .into_iter()
                .filter_map(|kind| app.detail.current(kind))
                .collect();
            join_all(pagers.iter().map(|p| p.settled())).await;
        }
        Route::Section(_) => {
            if let Some(pager) = app.section_view.current() {
                pager.settled().await;
            }
        }
    }
}

fn footer<K: Copy, V>(snapshot: &PagingSnapshot<K, V>) -> Option<String> {
    if let Some(e) = snapshot.full_screen_error() {
        return Some(format!("  ! {e} (r to retry)"));
    }
    if snapshot.refresh.is_loading() || snapshot.append.is_loading() {
        return Some("  ... loading".to_string());
    }
    if let LoadState::Failed(e) = &snapshot.append {
        return Some(format!("  ! {e} (n to retry)"));
    }
    if snapshot.end_reached() {
        None
    } else if snapshot.pages.is_empty() {
        Some("  (not loaded)".to_string())
    } else {
        Some("  n for more".to_string())
    }
}

pub fn render(app: &App, out: &mut impl Write) -> io::Result<()> {
    match app.route {
        Route::Home => {
            writeln!(out, "== Characters ==")?;
            let snapshot = app.characters.snapshot();
            for (i, c) in snapshot.items().enumerate() {
                writeln!(out, "{i:>4}. {}", c.name)?;
            }
            if let Some(line) = footer(&snapshot) {
                writeln!(out, "{line}")?;
            }
        }
        Route::Detail => {
            let Some(character) = app.selection.selected_character() else {
                return writeln!(out, "(no character selected)");
            };
            writeln!(out, "== {} ==", character.name)?;
            if !character.description.is_empty() {
                writeln!(out, "{}", character.description)?;
            }
            if let Some(url) = character.thumbnail.url() {
                writeln!(out, "image: {url}")?;
            }
            for kind in SectionType::ALL {
                let total = character.section_items(kind).len();
                writeln!(out, "-- {} ({total}) --", kind.label())?;
                let Some(pager) = app.detail.current(kind) else {
                    writeln!(out, "  (none)")?;
                    continue;
                };
                let snapshot = pager.snapshot();
                for item in snapshot.items().take(DETAIL_PREVIEW) {
                    writeln!(out, "  {}", item.name)?;
                }
                if let Some(e) = snapshot.full_screen_error() {
                    writeln!(out, "  ! {e}")?;
                } else if total > DETAIL_PREVIEW {
                    writeln!(out, "  s {} for all", kind.label().to_lowercase())?;
                }
            }
            for link in &character.related_links {
                writeln!(out, "{}: {}", link.kind, link.url)?;
            }
        }
        Route::Section(kind) => {
            writeln!(out, "== {} ==", kind.label())?;
            let Some(pager) = app.section_view.current() else {
                return writeln!(out, "(nothing to show)");
            };
            let snapshot = pager.snapshot();
            for (i, item) in snapshot.items().enumerate() {
                match &item.image_url {
                    Some(url) => writeln!(out, "{i:>4}. {} [{url}]", item.name)?,
                    None => writeln!(out, "{i:>4}. {}", item.name)?,
                }
            }
            if let Some(line) = footer(&snapshot) {
                writeln!(out, "{line}")?;
            }
        }
    }
    writeln!(out, "[{}]", app.status_message)
}

/// Reads commands from stdin until `q` or end of input.
pub async fn run(mut app: App) -> io::Result<()> {
    app.start();
    let mut stdout = io::stdout();
    writeln!(stdout, "{HELP}")?;
    settle(&app).await;
    render(&app, &mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = parse_command(&line);
        if command == Command::Help {
            writeln!(stdout, "{HELP}")?;
            continue;
        }
        let action = match to_action(&app, command) {
            Ok(action) => action,
            Err(message) => {
                writeln!(stdout, "{message}")?;
                continue;
            }
        };
        if let Some(action) = action {
            let effect = update(&mut app, action);
            if effect == Effect::Quit {
                break;
            }
            app.sync_views();
            perform(&app, effect).await;
        }
        settle(&app).await;
        render(&app, &mut stdout)?;
        stdout.flush()?;
    }

    info!("Shell exiting");
    Ok(())
}
