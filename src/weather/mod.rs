pub(crate) mod condition;
pub(crate) mod flags;
pub(crate) mod snapshot;
pub(crate) mod store;
