use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use phylonco_rs::io::params::load_params;
use phylonco_rs::quadrature::IterativeLegendreGauss;
use phylonco_rs::report::{EvaluationSummary, population_summary};
use phylonco_rs::utils::{row_sums, to_rows};
use phylonco_rs::{GompertzGrowth, Gt16Model, TernaryErrorModel};

#[derive(Parser, Debug)]
#[command(name = "phylonco")]
#[command(
    about = "Evaluate error matrices, GT16 rate matrices and Gompertz trajectories from a parameter file",
    long_about = None
)]
struct Cli {
    params_file: PathBuf,
    output_file: PathBuf,
    #[arg(long, default_value_t = 5.0, help = "Last time point of the population trajectory")]
    t_max: f64,
    #[arg(long, default_value_t = 21, help = "Number of trajectory points in [0, t_max]")]
    grid: usize,
    #[arg(
        long,
        help = "Override the quadrature evaluation budget for intensity integrals"
    )]
    max_evaluations: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if cli.grid == 0 {
        bail!("--grid must be >= 1");
    }
    if !cli.t_max.is_finite() || cli.t_max < 0.0 {
        bail!("--t-max must be finite and >= 0");
    }

    let params = load_params(&cli.params_file)?;
    let mut summary = EvaluationSummary::default();

    if let Some(cfg) = &params.error_model {
        let mut model = TernaryErrorModel::ternary(cfg.alpha, cfg.beta)
            .context("failed to build ternary error model")?
            .with_excluded_taxa(cfg.exclude.iter().cloned());
        let matrix = model.error_matrix();
        info!(
            "error matrix {}x{}, row sums {:?}",
            matrix.n_observed(),
            matrix.n_true(),
            matrix.row_sums()
        );
        summary.error_matrix = Some(matrix.to_rows());
    }

    if let Some(cfg) = &params.substitution {
        let mut model = Gt16Model::from_config(cfg).context("failed to build GT16 model")?;
        let q = model.rate_matrix();
        let worst = row_sums(q).into_iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
        info!("GT16 rate matrix built, max |row sum| = {worst:e}");
        summary.rate_matrix = Some(to_rows(q));
    }

    if let Some(cfg) = &params.population {
        let mut model =
            GompertzGrowth::from_config(cfg).context("failed to build Gompertz model")?;
        if let Some(max_evaluations) = cli.max_evaluations {
            let integrator = IterativeLegendreGauss::default().with_max_evaluations(max_evaluations);
            model = model.with_integrator(integrator);
        }
        let pop = population_summary(&model, cfg.tree_id.as_deref(), cli.t_max, cli.grid);
        let degraded = pop.trajectory.iter().filter(|p| !p.converged).count();
        info!(
            "Gompertz trajectory: {} points, N_inf = {}, {} degraded intensities",
            pop.trajectory.len(),
            pop.n_infinity,
            degraded
        );
        summary.population = Some(pop);
    }

    let file = File::create(&cli.output_file)
        .with_context(|| format!("failed to create {:?}", cli.output_file))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &summary)
        .with_context(|| format!("failed to write {:?}", cli.output_file))?;
    println!("Summary: {}", cli.output_file.display());
    Ok(())
}
