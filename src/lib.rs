pub mod container;
pub mod converter;
pub mod error;

pub use converter::{convert, convert_as_array, convert_file, Converter, MmlInput};
pub use error::Error;
