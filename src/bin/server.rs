use clap::Parser;
use rustph::config::Config;
use rustph::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    server::run(config).await
}
