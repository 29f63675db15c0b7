use crate::job::Job;
use clap::Parser;
use prediction::utils::logging::*;
use prediction::Visualizer;
use std::path::PathBuf;
use std::process::ExitCode;

pub mod job;

/// Draws prediction results described by a JSON job file.
#[derive(Debug, Parser)]
#[command(name = "predict", version)]
struct Args {
    /// Job file listing the images and their predictions.
    job: PathBuf,
    /// Display the results instead of writing them to the job's output.
    #[arg(long)]
    show: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let Args { job: job_path, show } = Args::parse();
    logging_information!(SystemEntry::Initializing);
    let job = match Job::load(&job_path) {
        Ok(job) => job,
        Err(err) => {
            logging_error!(err);
            return ExitCode::FAILURE;
        }
    };
    logging_information!(SystemEntry::InitializeComplete);
    logging_information!(format!("Running {} item(s) from {}", job.item_count(), job_path.display()));
    let result = tokio::task::spawn_blocking(move || {
        let visualizer = Visualizer::from_config()?;
        job.execute(&visualizer, show)
    }).await;
    logging_information!(SystemEntry::Terminating);
    let exit_code = match result {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            logging_entry!(err.to_log_entry());
            ExitCode::FAILURE
        }
        Err(err) => {
            logging_critical!(SystemEntry::TaskPanickedError(err.to_string()));
            ExitCode::FAILURE
        }
    };
    logging_information!(SystemEntry::TerminateComplete);
    exit_code
}
