use anyhow::Context;
use clap::Parser as ClapParser;
use extroute::ExternalRouter;
use flow::{pipeline, FlowOptions, RouteFailurePolicy, RouteOutcome};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let output = args
        .out
        .clone()
        .unwrap_or_else(|| args.checkpoint.with_extension("tcp"));

    println!("input checkpoint: {:?}", &args.checkpoint);
    println!("router: {}", &args.router);
    println!("output checkpoint: {:?}", &output);

    let summary = rscp2tcp(args, &output)?;

    match summary.route {
        RouteOutcome::Routed => println!(
            "Routing succeeded; exported {} cells and {} nets.",
            summary.cells, summary.nets
        ),
        RouteOutcome::Failed(e) => eprintln!(
            "Routing failed ({e}); exported the design anyway ({} cells, {} nets).",
            summary.cells, summary.nets
        ),
    }
    println!("Checkpoint writing complete.");

    Ok(())
}

/// Arguments to [`rscp2tcp`].
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Sanitize, route, and re-export a placed design checkpoint"
)]
pub struct Args {
    /// The path to the input checkpoint directory.
    checkpoint: PathBuf,
    /// The external router command.
    #[arg(short, long, default_value = "rsvroute")]
    router: String,
    /// The path where the output checkpoint should be written.
    ///
    /// The directory and its parents will be created if necessary.
    ///
    /// If unspecified, the input path with its extension replaced by `tcp`
    /// is used.
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Treat a routing failure as fatal instead of exporting the design
    /// anyway.
    #[arg(long)]
    abort_on_route_failure: bool,
}

/// Run the sanitize-route-export flow on the given checkpoint.
pub fn rscp2tcp(args: Args, output: &PathBuf) -> anyhow::Result<flow::FlowSummary> {
    let scratch = tempfile::tempdir().with_context(|| "Failed to create router scratch dir.")?;
    let mut router = ExternalRouter::new(&args.router, scratch.path());

    let options = FlowOptions {
        on_route_failure: if args.abort_on_route_failure {
            RouteFailurePolicy::Abort
        } else {
            RouteFailurePolicy::ContinueToExport
        },
        ..Default::default()
    };

    pipeline::run(&mut router, &args.checkpoint, output, options)
        .with_context(|| format!("Failed to export checkpoint to {:?}.", output))
}
