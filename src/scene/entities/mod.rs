pub(crate) mod background;
pub(crate) mod circadian;
pub(crate) mod particle_sky;
pub(crate) mod particles;
pub(crate) mod planets;
pub(crate) mod root;
pub(crate) mod sky;
pub(crate) mod thunderstorm;
pub(crate) mod wave;
