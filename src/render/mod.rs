pub(crate) mod context;
pub(crate) mod cpu;
pub(crate) mod recording;
pub(crate) mod surface;
pub(crate) mod text;
