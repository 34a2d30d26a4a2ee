use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use macropad_oled::{Args, OutputFormat, fake_hardware_client, real_hardware_client, run_with_options};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let mut stdout = std::io::stdout();

    let run_result = async {
        let default_output = if stdout.is_terminal() {
            OutputFormat::Pretty
        } else {
            OutputFormat::Json
        };
        let options = args.run_options(default_output);
        let (command, maybe_fake_args) = args.into_command_and_fake_args()?;
        let hardware_client = match maybe_fake_args {
            Some(fake_args) => fake_hardware_client(fake_args),
            None => real_hardware_client(),
        };

        run_with_options(command, &mut stdout, hardware_client, options).await
    }
    .await;

    match run_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
