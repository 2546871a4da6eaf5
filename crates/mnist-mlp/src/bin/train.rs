use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use mnist_mlp::{backend, cli::TrainArgs, logger::install_logger, training};

fn main() -> ExitCode {
    let args = TrainArgs::parse();
    install_logger(Some(&Path::new(&args.model_folder).join("experiment.log")));

    match training::train::<backend::TrainingBackend>(
        &args.model_folder,
        args.config(),
        &args.training_folder,
        &args.validation_folder,
        backend::device(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Training failed: {err}");
            eprintln!("Training failed: {err}");
            ExitCode::FAILURE
        }
    }
}
