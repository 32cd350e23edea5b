mod config;
mod error;
mod logging;
mod options;
mod prompts;
mod style;
mod templates;
mod term;
mod toml_parser;
mod tools;
mod util;

use error::AppError;
use options::Options;
use config::Config;
use tracing::info;

fn run_template() -> Result<(), AppError> {
    dotenv::dotenv().ok();

    let options = Options::load(std::env::args())?;
    logging::init(options.verbosity);

    let config: Config = options.try_into()?;
    info!(template = ?config.template, "starting");

    templates::run(config)
}

fn main() {
    if let Err(e) = run_template() { 
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
