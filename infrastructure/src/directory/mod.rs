//! Membership directory adapters.

pub mod static_dir;

pub use static_dir::StaticDirectory;
