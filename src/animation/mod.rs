pub(crate) mod ease;
pub(crate) mod effects;
pub(crate) mod particles;
pub(crate) mod phase;
