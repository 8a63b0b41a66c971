// Rich Presence capability
// The session manager talks to presence backends only through PresenceClient

mod discord;
mod traits;

pub use discord::DiscordPresence;
pub use traits::{PresenceActivity, PresenceClient, DEFAULT_LARGE_IMAGE};
