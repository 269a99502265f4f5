mod restore;
mod retry;
pub(crate) mod scheduler;

pub(crate) use restore::restore;
