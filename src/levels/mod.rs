//! Support/resistance level detection: grid quantization, bounce counting and ranking

pub mod counter;
pub mod engine;
pub mod error;
pub mod grid;
pub mod parser;
pub mod ranking;
pub mod validation;

pub use engine::{detect_levels, LevelEngine};
pub use error::LevelError;
pub use grid::{quantize, tick_index, TickGrid};
pub use parser::{parse_level_request, LevelRequest};
pub use ranking::{rank_levels, top_groups};
pub use validation::validate_request;
