//! loadlab-core: pure building blocks for the loadlab benchmark service.
//!
//! Everything here is deterministic, does no I/O, and holds no shared
//! state. The server crate wires these kernels to HTTP handlers and to
//! the database pool.

pub mod compute;
pub mod retry;
