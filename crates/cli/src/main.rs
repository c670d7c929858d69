use std::process::ExitCode;

fn main() -> ExitCode {
    chairfit_cli::run()
}
