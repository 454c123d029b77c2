// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
//   train   — train on MNIST, save history/metrics/curves
//   plot    — redraw curves from a saved history
//   filters — convolution kernel preview
//   show    — strip of dataset samples
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, FiltersArgs, PlotArgs, ShowArgs, TrainArgs};

use crate::application::plot_use_case::{CurvesUseCase, SamplesUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "mnist-lab",
    version,
    about = "Train small digit classifiers on MNIST and plot what they learn."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Plot(args)    => run_plot(args),
            Commands::Filters(args) => run_filters(args),
            Commands::Show(args)    => run_show(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let use_case = TrainUseCase::new(args.into());
    let history  = use_case.execute()?;

    if let Some(last) = history.epoch(history.len()) {
        println!(
            "Training complete. Final val acc={:.3}, val loss={:.3}",
            last.val_acc, last.val_loss
        );
    }
    Ok(())
}

fn run_plot(args: PlotArgs) -> Result<()> {
    let out      = args.out.clone();
    let history  = CurvesUseCase::from(args).execute()?;
    println!("Plotted {} epochs to {}", history.len(), out.display());
    Ok(())
}

fn run_filters(args: FiltersArgs) -> Result<()> {
    let use_case = args.into_use_case()?;
    use_case.execute()?;
    println!("Convolution preview written to {}", use_case.out.display());
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<()> {
    let use_case = SamplesUseCase::from(args);
    use_case.execute()?;
    println!("Samples written to {}", use_case.out.display());
    Ok(())
}
