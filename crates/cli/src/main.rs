use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    gamewise_cli::run()
}
