//! Command-line front end for cloudclean.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cloudclean::{
    filter_file, run_batch, CentroidDistanceFilter, CleanConfig, DensityClusterFilter,
    FilterMethod, PlyEncoding, RadiusOutlierFilter, StatisticalOutlierFilter,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cloudclean", version)]
#[command(about = "Remove outlier points from PLY point clouds", long_about = None)]
struct Cli {
    /// TOML file with filter parameters
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write ASCII PLY instead of binary
    #[arg(long, global = true)]
    ascii: bool,

    /// Log debug details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Statistical-neighbour removal by mean k-nearest-neighbour distance
    Statistical {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        k_neighbors: Option<usize>,

        #[arg(long)]
        std_ratio: Option<f32>,
    },

    /// Remove points with too few neighbours inside a radius
    Radius {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        min_points: Option<usize>,

        #[arg(long)]
        radius: Option<f32>,
    },

    /// Remove points far from the centroid
    Centroid {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        threshold_multiplier: Option<f32>,
    },

    /// Keep only the largest DBSCAN cluster
    Clustering {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        eps: Option<f32>,

        #[arg(long)]
        min_samples: Option<usize>,
    },

    /// Run the statistical, strict centroid and coarse clustering passes
    Batch {
        input: PathBuf,

        /// Directory for outputs (defaults to the input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the filter for a single-method subcommand. Flags win over the
/// config file, which wins over the defaults.
fn resolve(command: &Commands, config: &CleanConfig) -> Option<(PathBuf, PathBuf, FilterMethod)> {
    let resolved = match command {
        Commands::Statistical {
            input,
            output,
            k_neighbors,
            std_ratio,
        } => {
            let base = config.statistical;
            let filter = StatisticalOutlierFilter {
                k_neighbors: k_neighbors.unwrap_or(base.k_neighbors),
                std_ratio: std_ratio.unwrap_or(base.std_ratio),
            };
            (input.clone(), output.clone(), filter.into())
        }
        Commands::Radius {
            input,
            output,
            min_points,
            radius,
        } => {
            let base = config.radius;
            let filter = RadiusOutlierFilter {
                min_points: min_points.unwrap_or(base.min_points),
                radius: radius.unwrap_or(base.radius),
            };
            (input.clone(), output.clone(), filter.into())
        }
        Commands::Centroid {
            input,
            output,
            threshold_multiplier,
        } => {
            let filter = CentroidDistanceFilter {
                threshold_multiplier: threshold_multiplier
                    .unwrap_or(config.centroid.threshold_multiplier),
            };
            (input.clone(), output.clone(), filter.into())
        }
        Commands::Clustering {
            input,
            output,
            eps,
            min_samples,
        } => {
            let base = config.clustering;
            let filter = DensityClusterFilter {
                eps: eps.unwrap_or(base.eps),
                min_samples: min_samples.unwrap_or(base.min_samples),
            };
            (input.clone(), output.clone(), filter.into())
        }
        Commands::Batch { .. } => return None,
    };
    Some(resolved)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => CleanConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CleanConfig::default(),
    };
    let encoding = if cli.ascii {
        PlyEncoding::Ascii
    } else {
        config.encoding()
    };

    if let Commands::Batch { input, out_dir } = &cli.command {
        let outputs = run_batch(input, out_dir.as_deref(), encoding)
            .with_context(|| format!("batch run on {} failed", input.display()))?;
        for out in outputs {
            println!("[{}] {}", out.report.method, out.path.display());
            println!("{}", out.report);
        }
        return Ok(());
    }

    if let Some((input, output, method)) = resolve(&cli.command, &config) {
        let report = filter_file(&input, &output, &method, encoding)
            .with_context(|| format!("failed to filter {}", input.display()))?;
        println!("{report}");
    }
    Ok(())
}
