mod resolve_query;

pub use resolve_query::{soa_serial, ResolveDnsQueryUseCase};
