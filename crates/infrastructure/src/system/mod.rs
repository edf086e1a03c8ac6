pub mod address_lookup;
pub mod socket;

pub use address_lookup::PlatformAddressLookup;
pub use socket::{bind_tcp, bind_udp};
