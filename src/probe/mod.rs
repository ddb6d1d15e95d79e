pub mod endpoint_prober;
pub mod result;
pub mod template;

pub use endpoint_prober::EndpointProber;
pub use result::{ProbeAttempt, ProbeResult};
