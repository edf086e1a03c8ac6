mod apply_registration;

pub use apply_registration::{ApplyRegistrationUseCase, RegistrationOutcome};
