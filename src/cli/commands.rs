use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "meshchain")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "start", about = "Start a blockchain node")]
    Start {
        #[arg(
            long,
            help = "Address to listen on (host:port); falls back to NODE_ADDRESS, then 127.0.0.1:3000"
        )]
        listen: Option<String>,
        #[arg(long = "bootstrap", help = "Seed node addresses to bootstrap from")]
        bootstrap: Vec<String>,
        #[arg(long, help = "Run as a validator with a freshly generated key")]
        validator: bool,
        #[arg(
            long,
            help = "Validator key seed as 64 hex characters (implies --validator)"
        )]
        seed: Option<String>,
    },
    #[command(
        name = "demo",
        about = "Spawn a three-node demo network in this process and gossip transactions through it"
    )]
    Demo,
}
