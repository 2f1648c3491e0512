pub(crate) mod common;
pub(crate) mod convertor;
pub(crate) mod descriptor;
pub mod errors;
pub mod files;
pub mod metrics;
pub(crate) mod naming;
pub(crate) mod operations;
pub mod orchestrator;
pub(crate) mod render;
pub mod resolver;
pub(crate) mod schema;

#[cfg(test)]
mod tests;
