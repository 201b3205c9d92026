pub mod actions;
pub mod executor;
pub mod plugin;
pub mod queue;
pub mod result_log;

pub use actions::*;
pub use executor::execute_queued_actions;
pub use plugin::ActionsPlugin;
pub use queue::*;
pub use result_log::{ActionLog, ActionRecord};
