// Adapters layer: concrete `BookingStore` implementations for external
// systems. The REST adapter talks to the hosted backend; the in-memory store
// backs tests and the offline demo path.

pub mod memory;
pub mod rest;

pub use memory::InMemoryStore;
pub use rest::RestStore;
