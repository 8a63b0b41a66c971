// NPRPC - Now-playing Rich Presence relay
// Library exports

pub mod artwork; // Thumbnailing and webhook image hosting
pub mod config;
pub mod errors;
pub mod logging;
pub mod presence; // Rich Presence clients
pub mod server; // JSON-RPC front end and session lifecycle
