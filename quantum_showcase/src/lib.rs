//! Quantum Concept Showcase
//!
//! Five independent canvas animations hosted in one window:
//!
//! - **Particle Field**: drifting neon particles linked by distance-faded lines
//! - **Schrödinger's Box**: a superposed two-outcome state collapsed on demand
//! - **Entanglement**: two spins that stay opposite however far apart
//! - **Double Slit**: electron stream whose screen pattern depends on observation
//! - **Uncertainty**: a wave packet trading position spread for momentum spread
//!
//! Every module implements [`animation::Animation`] and draws into a
//! [`surface::RenderSurface`]; the [`showcase::Showcase`] drives them each
//! frame and the [`renderer::CanvasRenderer`] puts the result on screen.

pub mod palette;
pub mod surface;
pub mod scheduler;
pub mod animation;
pub mod config;
pub mod particle_field;
pub mod outcome_box;
pub mod paired_state;
pub mod emission;
pub mod uncertainty;
pub mod showcase;
pub mod tessellate;
pub mod renderer;
pub mod control_panel;
