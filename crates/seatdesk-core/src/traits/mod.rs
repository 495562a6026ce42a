//! Collaborator traits defined in `seatdesk-core` and implemented by
//! other crates or by the embedding application.

pub mod clock;
pub mod library;
pub mod provisioning;

pub use clock::{Clock, ManualClock, SystemClock};
pub use library::{LibraryDirectory, StaticLibraryDirectory};
pub use provisioning::ProvisioningBackend;
