use std::process::ExitCode;

use dayplan::cli::{commands::failure, describe_error, run_cli};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run_cli().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error running cli {e:?}");
            failure(describe_error(&e));
            ExitCode::FAILURE
        }
    }
}
