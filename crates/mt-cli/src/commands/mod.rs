//! CLI command implementations

mod attach;
mod config;
mod create;
mod destroy;
mod exec;
mod shell;

pub use attach::attach_command;
pub use config::{config_get, config_set, config_show, resolve_config};
pub use create::create_command;
pub use destroy::destroy_command;
pub use exec::exec_command;
pub use shell::shell_command;
