pub mod config;
pub mod db;
pub mod error;
pub mod providers;
pub mod server;
pub mod sync;
pub mod widget;

mod oauth_utils;

pub use error::{DashError, OauthError};
