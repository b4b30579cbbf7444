mod format;
mod help_overlay;
mod status_bar;
mod system_bar;

pub use format::{format_duration, format_memory, format_runtime, truncate_to_width};
pub use help_overlay::HelpOverlay;
pub use status_bar::{StatusBar, tab_hints};
pub use system_bar::{Header, SystemBar, usage_bar};
