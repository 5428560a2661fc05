use std::process::ExitCode;

use breakthrough_plots::log::{error, set_log_level, LevelFilter};
use breakthrough_plots::{run, OutputOptions};

fn main() -> ExitCode {
    set_log_level(LevelFilter::Info);

    match run(&OutputOptions::default()) {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
