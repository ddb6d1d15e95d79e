pub mod credentials;
pub mod token_broker;

pub use credentials::Credentials;
pub use token_broker::{BrokerSettings, TokenBroker};
