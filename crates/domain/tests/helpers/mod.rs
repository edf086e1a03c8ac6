pub mod builders;

pub use builders::HostEntryBuilder;
