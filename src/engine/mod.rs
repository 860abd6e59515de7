pub(crate) mod core;
pub(crate) mod driver;
pub(crate) mod metrics;
pub(crate) mod scheduler;
pub(crate) mod state;
pub(crate) mod strategy;
