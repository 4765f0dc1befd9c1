pub mod notify;
pub mod poller;

pub use notify::{LogNotificationSink, NotificationSink, PollSignals};
pub use poller::{PollCommand, PollDriver, PollReport, PollSettings};
