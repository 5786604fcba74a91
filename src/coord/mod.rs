pub(crate) mod readiness;
pub(crate) mod session;
pub(crate) mod signal;
