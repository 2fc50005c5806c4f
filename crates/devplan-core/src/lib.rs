//! Core of `devplan`: turn hybrid checkbox/tag planning text into an ordered,
//! numbered task list and render it as markdown.

pub mod context;
pub mod error;
pub mod pipeline;
pub mod plan;

pub use error::DevplanError;
