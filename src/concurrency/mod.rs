//! Lock-free primitives shared by the compute backends.

pub mod atomic;
