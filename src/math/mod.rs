mod color;

pub use color::{Color, ParseColorError};
