//! Statcard - Library for rendering end-game statistics cards
//!
//! This library provides functionality to:
//! - Resolve entity portraits and static assets through an image repository
//! - Style entities into chips and lay chips out into rosters
//! - Plan a card's canvas geometry from a statistics snapshot
//! - Compose, rasterize and encode the finished card

pub mod assets;
pub mod chip;
pub mod cli;
pub mod color;
pub mod composer;
pub mod config;
pub mod draw;
pub mod error;
pub mod ledger;
pub mod mode;
pub mod models;
pub mod output;
pub mod plan;
pub mod resolve;
pub mod roster;

pub use composer::{CardEngine, RenderOptions};
pub use error::{CardError, CompositionError};
