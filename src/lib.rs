mod error;
mod path;
mod value;
pub mod model;
mod recorder;
pub mod vcd;
pub mod driver;
pub mod blinky;

pub use error::*;
pub use path::Path;
pub use value::{Value, Width};
pub use model::*;
pub use recorder::*;
pub use vcd::VcdWriter;
pub use driver::*;
