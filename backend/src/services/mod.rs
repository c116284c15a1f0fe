//! Typed row helpers, one accessor per table.
//!
//! ARCHITECTURE
//! ============
//! Each accessor borrows the shared [`RestClient`](crate::rest::RestClient)
//! and exposes one method per remote call. No method batches, retries, or
//! caches; each returns the service's answer or its error message.

pub mod appointments;
pub mod doctors;
pub mod patients;
pub mod users;

pub use appointments::Appointments;
pub use doctors::Doctors;
pub use patients::Patients;
pub use users::Users;
