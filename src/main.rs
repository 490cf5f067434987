mod cli;

use clap::Parser;
use cli::{dispatch, Cli};
use env_logger::Env;
use log::debug;
use services::{GameService, ServiceContext};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    debug!("cli: saves_dir={}", args.saves_dir.display());

    let context = match ServiceContext::from_paths(&args.saves_dir, args.file.clone(), None) {
        Ok(context) => context,
        Err(err) => {
            print_json(&err.to_value());
            return ExitCode::FAILURE;
        }
    };
    let mut service = GameService::new(context);

    match dispatch(&args, &mut service) {
        Ok(result) => {
            print_json(&result);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_json(&err.to_value());
            ExitCode::FAILURE
        }
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("value serialises")
    );
}
