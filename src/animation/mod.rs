pub(crate) mod ease;
pub(crate) mod keyframes;
pub(crate) mod ops;
pub(crate) mod visual;
