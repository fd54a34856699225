mod db;
mod rooms;
mod streams;

pub use db::*;
pub use rooms::*;
pub use streams::*;
