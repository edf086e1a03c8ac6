//! Dynamic DNS Infrastructure Layer
pub mod cluster;
pub mod dns;
pub mod registration;
pub mod system;
