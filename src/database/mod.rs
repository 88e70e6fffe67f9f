pub mod db;
pub mod store;

pub use db::SqliteStore;
pub use store::{CardStore, DueFilter};
