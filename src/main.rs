use clap::Parser;

use campus_budget::cli::{Cli, Command, run_estimate, run_scenarios};

#[tokio::main]
async fn main() {
    campus_budget::logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => match args.into_state() {
            Ok((port, state)) => campus_budget::api::run_http_server(port, state)
                .await
                .map_err(|e| format!("Server error: {e}")),
            Err(msg) => Err(msg),
        },
        Command::Estimate(args) => run_estimate(args).map(|out| print!("{out}")),
        Command::Scenarios(args) => run_scenarios(args).map(|out| print!("{out}")),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        std::process::exit(1);
    }
}
