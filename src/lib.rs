//! CRUD HTTP service over location records, backed by SQLite through sqlx,
//! with a one-shot JSON fixture seeding routine.

pub mod config;
pub mod error;
pub mod handlers;
pub mod location;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::AppError;
pub use location::{Location, LocationPatch, NewLocation};
pub use routes::router;
pub use state::AppState;
