pub(crate) mod blur;
pub(crate) mod cpu;
pub(crate) mod engine;
pub(crate) mod glow;
pub(crate) mod recording;
pub(crate) mod surface;
