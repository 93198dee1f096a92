use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    netsleuth_cli::run().await
}
