//! Domain model for the membership service.
//!
//! # Responsibility
//! - Define entities, their create/update payloads and validation rules.
//! - Compute derived attributes (member age/active/remaining days, diet totals).
//!
//! # Invariants
//! - Every entity is identified by a non-nil UUID.
//! - Derived attributes are computed on read and never persisted.

pub mod diet;
pub mod meal;
pub mod member;
pub mod movement;
pub mod program;
pub mod validation;
