mod client;

pub use client::HabiticaClient;

pub const SERVICE: &str = "habitica";
