//! Step-through viewer core for chess games in PGN or book notation.
//!
//! Text goes through the classifier, is optionally converted to PGN by a
//! remote service, and is then split into headers, a strictly parsed
//! mainline and a ply -> comment map. A [`Viewer`] drives navigation over
//! the result and hands each position to a [`Renderer`].

pub mod viewer;

pub use viewer::{
    Command, Frame, Game, HeaderSet, Navigator, NotationConverter, Renderer, Settings,
    SettingsStore, TextRenderer, Viewer, ViewerError,
};
