use clap::Parser;
use seqcheck::{app, GeneratorConfig};
use std::path::PathBuf;
use std::process;

/// Publishes a monotonically increasing vector stream for path validation.
#[derive(Parser, Debug)]
#[command(name = "seq-gen")]
#[command(version, about, long_about = None)]
struct Args {
    /// Publish endpoint
    #[arg(long = "pub-ep")]
    pub_ep: Option<String>,

    /// Samples per vector
    #[arg(long)]
    vlen: Option<usize>,

    /// Target sample rate, elements per second
    #[arg(long = "samp-rate")]
    samp_rate: Option<f64>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    app::init_tracing();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("fatal: {err:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load_from_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(pub_ep) = args.pub_ep {
        config.pub_endpoint = pub_ep;
    }
    if let Some(vlen) = args.vlen {
        config.vlen = vlen;
    }
    if let Some(samp_rate) = args.samp_rate {
        config.samp_rate = samp_rate;
    }
    let shutdown = app::shutdown_flag()?;
    app::run_generator(config, shutdown)
}
