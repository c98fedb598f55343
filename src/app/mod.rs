//! Terminal front end: the interactive booth session and one-shot commands.

mod commands;
mod oneshot;
mod selector;
mod session;

pub use commands::SessionCommand;
pub use oneshot::{draw_svg_file, load_sample, print_ports, upload_sample_file};
pub use selector::SessionPortSelector;
pub use session::run_session;
