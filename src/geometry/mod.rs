pub(crate) mod cache;
pub(crate) mod sampler;
pub(crate) mod snapshot;
pub(crate) mod static_layout;
