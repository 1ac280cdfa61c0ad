//! Address and port assignment for the shared lab subnet.
//!
//! Node hosts come from [`AddressMapper`]; link underlay ports come from a
//! single [`LinkPortAllocator`] shared by every node of a run.

pub mod address;
pub mod port_allocator;

// Re-export commonly used types
pub use address::{port_of, AddressMapper};
pub use port_allocator::LinkPortAllocator;
