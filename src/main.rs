use clap::Parser;

use svg2cursor::cli::{self, Cli};
use svg2cursor::logger::Logger;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = cli::usage_exit_code(&e);
            if code == 0 {
                e.exit();
            }
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let logger = Logger::stderr(cli.log_level);
    let config = cli.into_config();

    if let Err(e) = cli::run(&config, &logger) {
        logger.error(format!("{:#}", e));
        std::process::exit(1);
    }
}
