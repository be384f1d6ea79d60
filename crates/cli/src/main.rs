use std::process::ExitCode;

fn main() -> ExitCode {
    showprice_cli::run()
}
