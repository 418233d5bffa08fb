//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads, the allocation core and store writes.
//! - Keep CLI callers decoupled from storage details.

pub mod allocation_service;
