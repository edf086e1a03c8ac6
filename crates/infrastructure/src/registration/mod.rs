pub mod codec;
pub mod listener;
pub mod sender;

pub use codec::{RegistrationCodec, MAX_PACKET_LEN};
pub use listener::UdpRegistrationListener;
pub use sender::RegistrationSender;
