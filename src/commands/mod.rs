pub mod download;
pub mod signals;
