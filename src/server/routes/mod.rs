pub mod fitbit;
pub mod health;
pub mod webhooks;
pub mod widget;
