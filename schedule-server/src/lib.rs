pub mod cache;
pub mod cli;
pub mod forms;
pub mod routes;
pub mod store;

pub use routes::{router, AppState};
