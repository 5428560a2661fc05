//! Charts relating vaccination coverage, vaccine effectiveness and breakthrough infections
//!
//! Under homogeneous mixing, the share of infections that occur in vaccinated people depends
//! only on the fraction of the population that is vaccinated and on how much the vaccine
//! reduces the risk of infection. This crate computes that relationship and its inverse and
//! renders the two charts used to discuss the Provincetown outbreak:
//! * `B_vs_V_forE.png`: the breakthrough fraction against coverage for several
//!   effectiveness values, with the observed 74% and the Massachusetts vaccination rate
//!   marked.
//! * `E_vs_V_forB.png`: the effectiveness implied by a 74% breakthrough fraction at each
//!   coverage level.
//!
//! The numerical modules ([`breakthrough`], [`implied`], [`coverage`]) are pure functions.
//! Charts are described as [`figure::Figure`] values by [`charts`] and only touch the
//! filesystem through [`render::save_figure`], driven by [`runner::run`].
pub mod breakthrough;
pub mod charts;
pub mod colormap;
pub mod coverage;
pub mod error;
pub mod figure;
pub mod implied;
pub mod log;
mod macros;
pub mod numeric;
pub mod output;
pub mod render;
pub mod runner;

pub use error::BreakthroughError;
pub use output::OutputOptions;
pub use runner::run;
