use anyhow::Result;
use macroregions::Config;

/// Merge the configuration file (if any) with command-line overrides and run the pipeline.
pub fn run(cli: &crate::cli::Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(input) = &cli.input { config.input_path = input.clone(); }
    if let Some(output) = &cli.output { config.output_path = output.clone(); }
    if let Some(regions) = &cli.regions { config.regions_path = Some(regions.clone()); }
    if let Some(k) = cli.clusters { config.n_clusters = k; }
    if let Some(contiguity) = cli.contiguity { config.contiguity = contiguity; }
    if let Some(search) = cli.search { config.search = search; }
    if let Some(assign_labels) = cli.assign_labels { config.assign_labels = assign_labels; }
    if let Some(seed) = cli.seed { config.seed = seed; }

    let summary = macroregions::run(&config)?;
    println!("{summary}");
    println!("[cluster] wrote {}", config.output_path.display());
    if let Some(path) = &config.regions_path {
        println!("[cluster] wrote {}", path.display());
    }

    Ok(())
}
