//! Terminal styling shared by the console and CLI output.

mod style;

pub use style::Style;
