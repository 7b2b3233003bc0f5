//! # Actions
//!
//! Everything that can happen in the browser becomes an `Action`.
//! User opens a character? That's `Action::OpenCharacter(c)`.
//! User asks for more rows? That's `Action::LoadMore`.
//!
//! `update()` applies the navigation part of an action to the state and
//! returns an [`Effect`] describing the network work to do. It never awaits;
//! the adapter runs the effect.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info};

use super::state::{App, Route};
use crate::catalog::{CharacterRef, SectionType};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Refresh,
    LoadMore,
    LoadMoreSection(SectionType),
    OpenCharacter(CharacterRef),
    OpenSection(SectionType),
    Back,
    Search(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    RefreshCharacters,
    LoadMoreCharacters,
    RefreshDetail,
    LoadMoreSection(SectionType),
    RefreshSectionView,
    LoadMoreSectionView,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("Action: {:?}", action);
    match action {
        Action::Quit => Effect::Quit,

        Action::Refresh => match app.route {
            Route::Home => Effect::RefreshCharacters,
            Route::Detail => Effect::RefreshDetail,
            Route::Section(_) => Effect::RefreshSectionView,
        },

        Action::LoadMore => match app.route {
            Route::Home => Effect::LoadMoreCharacters,
            Route::Section(_) => Effect::LoadMoreSectionView,
            Route::Detail => {
                app.status_message = String::from("Pick a section to load more of it");
                Effect::None
            }
        },

        Action::LoadMoreSection(kind) => match app.route {
            Route::Detail => Effect::LoadMoreSection(kind),
            Route::Section(shown) if shown == kind => Effect::LoadMoreSectionView,
            _ => Effect::None,
        },

        Action::OpenCharacter(character) => {
            info!("Opening character {} ({})", character.id, character.name);
            app.status_message = character.name.clone();
            app.selection.select(Some(character));
            app.route = Route::Detail;
            Effect::None
        }

        Action::OpenSection(kind) => {
            if app.route != Route::Detail {
                return Effect::None;
            }
            let Some(character) = app.selection.selected_character() else {
                return Effect::None;
            };
            let items = character.section_items(kind);
            if items.is_empty() {
                app.status_message = format!(
                    "No {} for {}",
                    kind.label().to_lowercase(),
                    character.name
                );
                return Effect::None;
            }
            app.status_message = format!("{}: {}", character.name, kind.label());
            app.selection.select_section(items);
            app.route = Route::Section(kind);
            Effect::None
        }

        Action::Back => {
            match app.route {
                Route::Section(_) => {
                    app.selection.clear_section();
                    app.route = Route::Detail;
                    if let Some(c) = app.selection.selected_character() {
                        app.status_message = c.name;
                    }
                }
                Route::Detail => {
                    app.selection.select(None);
                    app.route = Route::Home;
                    app.status_message = String::from("Characters");
                }
                Route::Home => {}
            }
            Effect::None
        }

        Action::Search(query) => {
            app.status_message = format!("Search is not available yet ('{query}')");
            Effect::None
        }
    }
}
