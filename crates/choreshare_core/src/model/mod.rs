//! Domain model for two-user chore allocation.
//!
//! # Responsibility
//! - Define the records exchanged between the allocation core, the load
//!   store and the assignment sink.
//! - Keep wire encodings (`0|1|2` exception tags, `1|2` user ids) lossless.
//!
//! # Invariants
//! - A chore is identified by its natural key `(name, day)`.
//! - Exactly two users participate; slots are `UserSlot::One` and `UserSlot::Two`.

pub mod chore;
pub mod load;
