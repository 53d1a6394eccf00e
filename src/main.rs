use clap::Parser;
use miette::Result;
use qcr::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let default_level = if global.verbose { "qcr=debug" } else { "qcr=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Columns(args) => qcr::cli::commands::columns::run(args, &global),
        Commands::Schema(args) => qcr::cli::commands::schema::run(args, &global),
        Commands::Auditors(args) => qcr::cli::commands::auditors::run(args, &global),
        Commands::Summary(args) => qcr::cli::commands::summary::run(args, &global),
        Commands::List(args) => qcr::cli::commands::list::run(args, &global),
        Commands::Show(args) => qcr::cli::commands::show::run(args, &global),
        Commands::Decide(args) => qcr::cli::commands::decide::run(args, &global),
        Commands::Completions(args) => qcr::cli::commands::completions::run(args),
    }
}
