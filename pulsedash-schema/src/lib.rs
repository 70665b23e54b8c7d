pub mod fitbit;
pub mod habitica;
pub mod todoist;
pub mod widget;

pub use fitbit::{ActivityResponse, WeightResponse};
pub use habitica::{Daily, Habit, HabiticaEnvelope, HabiticaWebhook};
pub use todoist::{TodoistStats, TodoistTask, TodoistTaskPage, TodoistWebhook};
pub use widget::WidgetSnapshot;
