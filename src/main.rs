use anyhow::Result;
use clap::Parser;
use vgen::{CLIArguments, interface_main};

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    match args {
        CLIArguments::Interface(args) => interface_main(args),
    }
}
