use crate::console::{run_filter, run_form, run_regions, FilterArgs, FormArgs, RegistryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use school_select::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "School Selection Assistant",
    about = "Filter the school register, check a selection and print the selection form",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Browse the school register
    Schools {
        #[command(subcommand)]
        command: SchoolsCommand,
    },
    /// Validate a selection and write the printable form
    Form(FormArgs),
}

#[derive(Subcommand, Debug)]
enum SchoolsCommand {
    /// List the regions present in the register
    Regions(RegistryArgs),
    /// List schools a student is eligible for
    Filter(FilterArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) registry: RegistryArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Schools {
            command: SchoolsCommand::Regions(args),
        } => run_regions(args),
        Command::Schools {
            command: SchoolsCommand::Filter(args),
        } => run_filter(args),
        Command::Form(args) => run_form(args),
    }
}
