//! Discord webhook notifications.

pub mod discord;
pub mod settings;
pub mod transport;

pub use discord::{Delivery, DiscordNotifier, Embed, MessageOptions, WebhookPayload};
pub use settings::{Endpoint, NotifierSettings};
pub use transport::{HttpTransport, WebhookTransport};
