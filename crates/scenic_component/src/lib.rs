//! # scenic_component
//!
//! The "C" in ECS — defines what a component is, how it is stored, and how
//! component types are identified at runtime.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all per-object data must satisfy.
//! - [`Object`] — lightweight `u32` object handles, plus the recycling
//!   [`ObjectAllocator`].
//! - [`Signature`] — word-packed bitsets over registered [`ComponentId`]s.
//! - [`ComponentRegistry`] — the `TypeId → ComponentId` table built once at
//!   registration.
//! - [`DenseColumn`] / [`Column`] — per-type dense storage behind a
//!   non-generic interface, combined into a [`ComponentStore`].
//! - [`ComponentSet`] — tuples of component types used to register, define
//!   object templates, and build query signatures.

pub mod component;
pub mod object;
pub mod registry;
pub mod set;
pub mod signature;
pub mod storage;

pub use component::Component;
pub use object::{Object, ObjectAllocator};
pub use registry::ComponentRegistry;
pub use set::ComponentSet;
pub use signature::{COMPONENT_CAP, ComponentId, SIGNATURE_WORDS, Signature};
pub use storage::{Column, ComponentStore, DenseColumn};
