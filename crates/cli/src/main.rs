use std::process::ExitCode;

fn main() -> ExitCode {
    wearcast_cli::run()
}
