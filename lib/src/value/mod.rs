mod format;
mod sink;

pub use format::*;
pub use sink::*;
