//! Data side of the field viewer.
//!
//! Everything here runs without a window: parsing of the fixed-layout data
//! files, the contour geometry behind the plots, the simulated inference
//! worker, the YAML configuration and the state the GUI reacts to.
pub mod config;
pub mod contour;
mod error;
pub mod inference;
pub mod results;
pub mod sample;
pub mod viewer;

pub use error::{Error, Result};
pub use sample::{Matrix, MeasurementPair, RawSample};
