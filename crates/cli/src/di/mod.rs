pub mod state;
pub mod use_cases;

pub use state::build_state;
pub use use_cases::UseCases;
