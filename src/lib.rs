// Library surface for the game engine, shared by the binary and integration tests.
// The terminal view lives in main.rs/ui.rs and stays out of here.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod round;
pub mod runtime;
pub mod session;
pub mod util;
pub mod variant;
pub mod vocabulary;
pub mod word_pool;

pub use error::{Result, WordrushError};
pub use round::{Outcome, Round, RoundState};
pub use session::{Action, EndReason, Light, Phase, Session, SessionEvent, SessionSummary};
pub use variant::{GameKind, Rules};
pub use vocabulary::{Association, VocabEntry, Vocabulary};
pub use word_pool::{WordKind, WordPool};
