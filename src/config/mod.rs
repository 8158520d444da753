pub mod settings;
pub mod tokens;

pub use settings::{AppSettings, ChainSettings, ScoringSettings, Settings, SourceSettings};
pub use tokens::{TokenCategory, TokenInfo, TokenRegistry, NATIVE_TOKEN_ADDRESS};
