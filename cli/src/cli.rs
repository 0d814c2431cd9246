use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Areal interpolation CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "arealize", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Disaggregate using the density of control points per target zone
    Density(RunArgs),

    /// Disaggregate using the distance to the nearest control point
    Distance(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target zone polygons (.geojson or .shp)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub targets: PathBuf,

    /// Source zone polygons carrying the quantity to redistribute
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub sources: PathBuf,

    /// Control features (points, or polygons reduced to centroids)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub controls: PathBuf,

    /// Output table (.csv, or .geojson to keep the target geometries)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Power parameter controlling the degree of local influence
    /// (default: 1.0 for density, 0.2 for distance)
    #[arg(short = 'q', long)]
    pub exponent: Option<f64>,

    /// Key field of the target layer
    #[arg(long, default_value = "targetID")]
    pub target_id: String,

    /// Key field of the source layer
    #[arg(long, default_value = "sourceID")]
    pub source_id: String,

    /// Key field of the control layer (row numbers when omitted)
    #[arg(long)]
    pub control_id: Option<String>,

    /// Source field holding the known quantity
    #[arg(long, default_value = "Spop")]
    pub population: String,

    /// Overwrite the output if it exists
    #[arg(long)]
    pub force: bool,
}
