mod cli;

use cli::Cli;
use log::error;

fn main() {
    // Log level comes from the config file's [logging] section; RUST_LOG
    // takes precedence when set.
    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
