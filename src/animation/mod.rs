pub(crate) mod transition;
