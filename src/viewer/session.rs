use super::classifier::looks_like_prose;
use super::convert::{NotationConverter, normalize_converted_pgn};
use super::error::ViewerError;
use super::game::Game;
use super::log;
use super::render::Renderer;
use super::settings::{Settings, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Prev,
    Next,
    End,
    /// `None` is the initial position.
    GoTo(Option<usize>),
}

impl Command {
    /// Keyboard bindings: arrows step, Home/End jump.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Prev),
            "ArrowRight" => Some(Self::Next),
            "Home" => Some(Self::Start),
            "End" => Some(Self::End),
            _ => None,
        }
    }
}

/// Ties settings, the current game and a renderer together. Every load
/// replaces the game wholesale; a failed load keeps the previous one.
pub struct Viewer<R> {
    settings: Settings,
    game: Option<Game>,
    renderer: R,
}

impl<R: Renderer> Viewer<R> {
    pub fn new(settings: Settings, renderer: R) -> Self {
        Self {
            settings,
            game: None,
            renderer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_api_key(
        &mut self,
        store: &mut dyn SettingsStore,
        value: &str,
    ) -> Result<(), ViewerError> {
        self.settings.set_api_key(store, value)
    }

    pub fn set_system_prompt(
        &mut self,
        store: &mut dyn SettingsStore,
        value: &str,
    ) -> Result<(), ViewerError> {
        self.settings.set_system_prompt(store, value)
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Loads PGN or, when the input reads like book prose, converts it first.
    ///
    /// Returns the PGN text that was loaded so the host can show converted
    /// text in place of the original input, or `None` for blank input.
    pub fn load_input(
        &mut self,
        input: &str,
        converter: &dyn NotationConverter,
    ) -> Result<Option<String>, ViewerError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let pgn = if looks_like_prose(input) {
            log::info("input looks like book notation, converting");
            self.convert(input, converter)?
        } else {
            input.to_string()
        };

        let game = Game::load(&pgn).inspect_err(|e| log::error(e.to_string()))?;
        log::info(format!(
            "loaded game with {} plies and {} comments",
            game.navigator().len(),
            game.comments().len()
        ));

        self.game = Some(game);
        self.render();
        Ok(Some(pgn))
    }

    fn convert(
        &self,
        input: &str,
        converter: &dyn NotationConverter,
    ) -> Result<String, ViewerError> {
        let Some(credential) = self.settings.credential() else {
            log::warn("conversion requested without an API key");
            return Err(ViewerError::MissingCredential);
        };

        let converted = converter
            .convert(input, credential, &self.settings.system_prompt)
            .inspect_err(|e| log::error(e.to_string()))?;
        Ok(normalize_converted_pgn(&converted))
    }

    /// Applies a navigation command and redraws. Returns `false` without
    /// redrawing when there is no game or the request was ignored (a step
    /// past either end, or an out-of-range jump).
    pub fn dispatch(&mut self, command: Command) -> bool {
        let Some(game) = self.game.as_mut() else {
            return false;
        };

        let nav = game.navigator_mut();
        let moved = match command {
            Command::Start => {
                nav.go_to_start();
                true
            }
            Command::Prev => nav.step_backward(),
            Command::Next => nav.step_forward(),
            Command::End => {
                nav.go_to_end();
                true
            }
            Command::GoTo(target) => match nav.go_to(target) {
                Ok(()) => true,
                Err(e) => {
                    log::warn(format!("ignoring navigation request: {e}"));
                    false
                }
            },
        };

        if moved {
            self.render();
        }
        moved
    }

    fn render(&mut self) {
        if let Some(game) = &self.game {
            self.renderer
                .render(game.navigator().position(), &game.frame());
        }
    }
}
