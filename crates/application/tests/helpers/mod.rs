#![allow(unused_imports)]

pub mod builders;
pub mod mock_ports;

pub use builders::{entry, state_with};
pub use mock_ports::MockAddressLookup;
