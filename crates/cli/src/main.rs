use std::process::ExitCode;

fn main() -> ExitCode {
    quotebox_cli::run()
}
