mod change_log_writer;
mod matnet_cli_error;
mod network_snapshot;

pub use change_log_writer::{write_change_log, ChangeLogRow};
pub use matnet_cli_error::MatnetCliError;
pub use network_snapshot::NetworkSnapshot;
