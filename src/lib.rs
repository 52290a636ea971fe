pub mod app;
pub mod board;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod events;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::LocalStorage;
