use log::error;
use shadowcube::app;
use shadowcube::io::config::Config;
use std::process;

const CONFIG_PATH: &str = "demo.toml";

fn main() {
    env_logger::init();

    // A missing config file just means defaults; a malformed one is fatal.
    let config = match Config::load_or_default(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    app::run_gui(config);
}
