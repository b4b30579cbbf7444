//! Screen implementations

mod log_list;
mod process_list;

pub use log_list::LogListScreen;
pub use process_list::ProcessListScreen;
