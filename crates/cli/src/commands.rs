use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ingestion control loop until signalled.
    Run {
        #[arg(
            long,
            help = "Optional .env file applied on top of the process environment"
        )]
        env_file: Option<String>,
    },
}
