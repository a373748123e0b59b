pub mod classifier;
pub mod comments;
pub mod convert;
pub mod error;
pub mod filter;
pub mod game;
pub mod headers;
mod log;
pub mod navigator;
pub mod render;
pub mod session;
pub mod settings;
pub mod types;

pub use classifier::looks_like_prose;
pub use comments::extract_comments;
pub use convert::{
    ConverterConfig, HttpResponse, NotationConverter, RemoteConverter, Transport,
    normalize_converted_pgn,
};
pub use error::{ErrorAccumulator, ViewerError};
pub use filter::{parse_mainline, split_pgn, strip_comments};
pub use game::Game;
pub use headers::{GameInfo, HeaderSet, extract_headers};
pub use navigator::{Controls, GameStatus, Navigator};
pub use render::{Frame, Renderer, TextRenderer};
pub use session::{Command, Viewer};
pub use settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
pub use types::{CommentMap, Ply};
