mod db;
pub mod entry;
pub mod testing;

pub use db::*;
