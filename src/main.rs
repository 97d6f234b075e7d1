//! sift: command-language interpreter.
//!
//! All arguments joined by spaces form the first commands. After those (or
//! straight away, with no arguments) commands are read interactively until
//! `quit`, `exit` or end of input.
//!
//! `sift --dump-config` prints the merged configuration as TOML.

use sift::config::Config;
use sift::{Interpreter, SystemHost, logging};

const RULE: &str = "========================================";

fn banner(config: &Config, title: &str) {
    if config.settings.banner {
        println!("{RULE}");
        println!("{title}");
        println!("{RULE}");
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load();

    if let [flag] = args.as_slice()
        && flag == "--dump-config"
    {
        match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("sift: config serialize error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    logging::init(&config.settings);
    log::info!("start: {args:?}");

    banner(&config, "SIFT Engine Main Entry Point");
    let mut interp = Interpreter::new(&config, SystemHost::new());
    let exit = interp.run(&args.join(" "));
    log::info!("exit: {exit:?}");
    banner(&config, "Exiting SIFT Engine");
}
