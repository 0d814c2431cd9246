use anyhow::Result;
use arealize::{
    disaggregate_by_density, write_output, DensityParams, PointLayer, PolygonLayer, RTreeEngine,
};

use crate::cli::{Cli, RunArgs};

pub fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    if cli.verbose > 0 {
        eprintln!(
            "[density] targets={} sources={} controls={} -> {}",
            args.targets.display(),
            args.sources.display(),
            args.controls.display(),
            args.output.display()
        );
    }

    let targets = PolygonLayer::read_from_path(&args.targets, &args.target_id)?;
    let sources = PolygonLayer::read_from_path(&args.sources, &args.source_id)?;
    let controls = PointLayer::read_from_path(&args.controls, args.control_id.as_deref())?;
    if cli.verbose > 1 {
        eprintln!(
            "[density] {} targets, {} sources, {} controls",
            targets.len(),
            sources.len(),
            controls.len()
        );
    }

    let params = DensityParams {
        exponent: args.exponent.unwrap_or(1.0),
        population: args.population.clone(),
    };
    let mut result = disaggregate_by_density(&targets, &sources, &controls, &RTreeEngine, &params)?;

    write_output(&args.output, &mut result.table, &targets, args.force)?;
    println!(
        "Process completed. The disaggregated variable is named 'value' in {}",
        args.output.display()
    );
    Ok(())
}
