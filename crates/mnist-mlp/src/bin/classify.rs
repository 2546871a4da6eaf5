use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use mnist_mlp::{
    backend,
    cli::ClassifyArgs,
    inference::{list_image_files, Classifier},
    logger::install_logger,
    translator::ascii_preview,
    MnistError,
};

fn run(args: &ClassifyArgs) -> Result<(), MnistError> {
    let files = list_image_files(&args.inputs)?;
    let classifier = Classifier::<backend::Backend>::load(&args.model_folder, backend::device())?;

    for path in files {
        let image = classifier.translator().load_image(&path)?;
        if args.preview {
            println!("{}", ascii_preview(&image));
        }

        let classifications = classifier.classify_image(image);
        log::info!("{}", path.display());
        log::info!("{classifications}");
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = ClassifyArgs::parse();
    install_logger(None);

    if args.inputs.is_empty() {
        eprintln!(
            "You did not specify any images to classify. Pass image files or folders as arguments.\n"
        );
        let _ = ClassifyArgs::command().print_help();
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Classification failed: {err}");
            eprintln!("Classification failed: {err}");
            ExitCode::FAILURE
        }
    }
}
