//! `knotline-core` -- pure domain logic for trajectory knot annotation.
//!
//! Everything in this crate is synchronous and free of I/O. The
//! `knotline-session` crate drives it from UI events and talks to the
//! external collaborators (trajectory source, submission sink, progress
//! store).
//!
//! - [`knots`] -- the per-trajectory knot set and its invariants.
//! - [`resolver`] -- draw-order strategies over a knot set.
//! - [`viewport`] -- data-space to pixel-space mapping for drawing.
//! - [`submission`] -- wire format and the collector that builds it.
//! - [`review`] -- admin-side regrouping and re-ordering of stored rows.

pub mod config;
pub mod credential;
pub mod error;
pub mod knots;
pub mod progress;
pub mod resolver;
pub mod review;
pub mod submission;
pub mod trajectory;
pub mod types;
pub mod viewport;
