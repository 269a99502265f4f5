mod dispatcher;
mod events;
mod monitor;
mod server;
pub(crate) mod signals;
mod watchdog;

pub use server::run;
