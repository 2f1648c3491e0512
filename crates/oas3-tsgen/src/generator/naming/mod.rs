pub(crate) mod context;
pub(crate) mod fingerprint;
pub(crate) mod identifiers;
pub(crate) mod operations;
