//! Application layer - composition root and task supervision.

mod runtime;
mod supervisor;

pub use runtime::App;
pub use supervisor::{Liveness, TaskHandle};
