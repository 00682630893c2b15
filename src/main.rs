use clap::Parser;
use groomba::cli::{execute_command, Cli};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = execute_command(cli) {
        eprintln!("groomba: {}", e);
        std::process::exit(1);
    }
}
