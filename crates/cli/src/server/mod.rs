pub mod dns;
pub mod registration;

pub use dns::start_dns_server;
pub use registration::start_registration_listener;
