//! CLI command implementations

mod stream;
mod verify;

pub use stream::stream;
pub use verify::verify;
