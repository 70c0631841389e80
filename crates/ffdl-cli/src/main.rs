use ffdl_lib::cli::{parse_args, resolve_command, run_download};
use ffdl_lib::error::FfdlError;
use std::process::ExitCode;

async fn run() -> Result<(), FfdlError> {
    let args = parse_args();
    let params = resolve_command(args.command)?;
    run_download(params).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("ERROR: {err}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
