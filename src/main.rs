use gdget::cli::Cli;
use gdget::logging;

fn main() {
    // Initialize logging as early as possible. If the XDG state dir is not
    // writable, fall back to stderr instead of refusing to run.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    if let Err(err) = Cli::run_from_args() {
        eprintln!("gdget error: {:#}", err);
        std::process::exit(1);
    }
}
