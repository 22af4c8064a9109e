pub mod amount;
pub mod clock;
pub mod config;
pub mod csv;
pub mod draw;
pub mod engine;
pub mod model;
pub mod sim;
pub mod store;

pub use amount::Amount;
pub use config::GameConfig;
pub use engine::GameSession;
pub use model::{Phase, PlayerAction, RoundReport, Snapshot};
