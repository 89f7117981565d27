// Module messaging - Commandes et notifications entre threads

pub mod channels;
pub mod command;
pub mod notification;

pub use channels::{
    CommandConsumer, CommandProducer, NotificationConsumer, NotificationProducer,
    create_command_channel, create_notification_channel,
};
pub use command::{COMMAND_HELP, Command, CommandParseError};
pub use notification::{Notification, NotificationCategory, NotificationLevel};
