pub mod db;
pub mod websites;

pub use db::DB;
