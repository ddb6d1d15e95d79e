pub mod common;
pub mod diagnostics_flow;
