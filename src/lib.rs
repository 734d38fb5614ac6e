pub mod app;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use app::config::Config;
pub use app::error::{AppError, AppResult};
pub use app::router::build_router;
pub use app::state::AppState;
