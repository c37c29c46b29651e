//! Tournament registrations.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{RegistrationError, RegistrationResult};
pub use manager::RegistrationManager;
pub use models::{
    NewRegistration, Registration, RegistrationId, RegistrationStatus, RegistrationUpdate,
};
