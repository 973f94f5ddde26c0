//! Output helpers shared by the library and the CLI

pub mod display;

pub use display::{BoardFormatter, Color, ColorOutput, BOARD_HEADER};
