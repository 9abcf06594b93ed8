pub mod config;
pub mod dispatch;
pub mod error;
pub mod livekit;
pub mod logging;
pub mod server;
pub mod session;
pub mod sheets;
pub mod shutdown;
pub mod transliterate;
pub mod webhook;

#[cfg(test)]
mod testing;
