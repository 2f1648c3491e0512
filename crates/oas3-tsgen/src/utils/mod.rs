pub mod output;
pub mod spec;
