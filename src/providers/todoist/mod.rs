mod client;

pub use client::TodoistClient;

pub const SERVICE: &str = "todoist";
