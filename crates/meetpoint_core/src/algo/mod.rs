pub(crate) mod bfgs;
pub(crate) mod nelder_mead;
pub(crate) mod problem;
