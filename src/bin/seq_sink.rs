use clap::Parser;
use seqcheck::{app, VerifierConfig};
use std::path::PathBuf;
use std::process;

/// Subscribes to a vector stream and audits continuity, corruption, and
/// throughput.
#[derive(Parser, Debug)]
#[command(name = "seq-sink")]
#[command(version, about, long_about = None)]
struct Args {
    /// Subscribe endpoint
    #[arg(long = "sub-ep")]
    sub_ep: Option<String>,

    /// Samples per vector
    #[arg(long)]
    vlen: Option<usize>,

    /// Transport high-water-mark; non-positive means unset
    #[arg(long)]
    hwm: Option<i64>,

    /// Drop events tolerated before stopping
    #[arg(long = "max-err")]
    max_err: Option<u64>,

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
        Some(path) => VerifierConfig::load_from_file(path)?,
        None => VerifierConfig::default(),
    };
    if let Some(sub_ep) = args.sub_ep {
        config.sub_endpoint = sub_ep;
    }
    if let Some(vlen) = args.vlen {
        config.vlen = vlen;
    }
    if let Some(hwm) = args.hwm {
        config.hwm = hwm;
    }
    if let Some(max_err) = args.max_err {
        config.max_err = max_err;
    }
    let shutdown = app::shutdown_flag()?;
    app::run_verifier(config, shutdown)
}
