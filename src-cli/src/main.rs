use std::process::ExitCode;

fn main() -> ExitCode {
    clausewise_lib::run()
}
