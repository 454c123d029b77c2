// ============================================================
// Layer 6 — Plot Rendering
// ============================================================
// Draws figures to PNG files with plotters' BitMapBackend.
//
//   plot_results     — two panels side by side: accuracy curves
//                      and loss curves (training vs validation)
//   plot_convolution — 2×6 grid: five originals on top, the same
//                      five after filtering below, the kernel
//                      in the top-right cell
//   display_dataset  — one row of sample images, drawn on a
//                      shared intensity scale, titled by class
//
// Images are drawn as greyscale heatmaps, one filled rectangle
// per source pixel, stretched to the cell they are placed in.

use anyhow::{anyhow, Result};
use plotters::{coord::Shift, prelude::*};
use std::{fmt::Debug, fs, path::Path};

use crate::domain::{
    history::History,
    image::{joint_range, Image},
};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const CURVES_SIZE:  (u32, u32) = (1500, 500);
const FILTERS_SIZE: (u32, u32) = (800, 340);
const SAMPLES_ROW_HEIGHT: u32  = 300;

fn draw_err<E: Debug>(err: E) -> anyhow::Error {
    anyhow!("plot rendering failed: {err:?}")
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// ─── Learning curves ──────────────────────────────────────────────────────────

/// Render accuracy and loss curves of a history to `path`.
pub fn plot_results(history: &History, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let root = BitMapBackend::new(path, CURVES_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let (left, right) = root.split_horizontally(CURVES_SIZE.0 / 2);
    draw_curves(&left, "Accuracy", &[
        ("Training acc", history.train_acc.as_slice(), BLUE),
        ("Validation acc", history.val_acc.as_slice(), RED),
    ])?;
    draw_curves(&right, "Loss", &[
        ("Training loss", history.train_loss.as_slice(), BLUE),
        ("Validation loss", history.val_loss.as_slice(), RED),
    ])?;

    root.present().map_err(draw_err)?;
    tracing::info!("Learning curves written to '{}'", path.display());
    Ok(())
}

fn draw_curves(area: &Area<'_>, caption: &str, series: &[(&str, &[f64], RGBColor)]) -> Result<()> {
    let epochs = series.iter().map(|(_, v, _)| v.len()).max().unwrap_or(0);
    let (lo, hi) = value_range(series.iter().flat_map(|(_, v, _)| v.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..x_extent(epochs), lo..hi)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .draw()
        .map_err(draw_err)?;

    for &(label, values, color) in series {
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
                color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

/// Right edge of the x axis; a single point still gets a visible span.
fn x_extent(epochs: usize) -> f64 {
    (epochs.saturating_sub(1) as f64).max(1.0)
}

/// Y-axis range covering all finite values, anchored at 0 and padded 10%.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0f64, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !hi.is_finite() || hi <= lo {
        return (lo, lo + 1.0);
    }
    (lo, hi + (hi - lo) * 0.1)
}

// ─── Image grids ──────────────────────────────────────────────────────────────

/// Map a value already in [0, 1] to a grey level.
fn grey(v: f32) -> RGBColor {
    let b = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(b, b, b)
}

/// Stretch `image` over the whole of `area`, scaled by `range`.
fn draw_image<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, image: &Image, range: (f32, f32)) -> Result<()> {
    let (cell_w, cell_h) = area.dim_in_pixel();
    let (cell_w, cell_h) = (cell_w as usize, cell_h as usize);

    for y in 0..image.height {
        for x in 0..image.width {
            let x0 = (x * cell_w / image.width) as i32;
            let x1 = ((x + 1) * cell_w / image.width) as i32;
            let y0 = (y * cell_h / image.height) as i32;
            let y1 = ((y + 1) * cell_h / image.height) as i32;
            area.draw(&Rectangle::new(
                [(x0, y0), (x1, y1)],
                grey(image.normalized_at(x, y, range)).filled(),
            ))
            .map_err(draw_err)?;
        }
    }
    Ok(())
}

/// Render the convolution preview grid for a kernel.
///
/// `originals` and `filtered` are drawn pairwise, one column per image,
/// each image on its own intensity scale.
pub fn plot_convolution(
    originals: &[Image],
    filtered:  &[Image],
    kernel:    &Image,
    title:     &str,
    path:      &Path,
) -> Result<()> {
    ensure_parent(path)?;
    let root = BitMapBackend::new(path, FILTERS_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let body = if title.is_empty() {
        root.clone()
    } else {
        root.titled(title, ("sans-serif", 28)).map_err(draw_err)?
    };

    let cols  = originals.len().max(filtered.len()) + 1;
    let cells = body.split_evenly((2, cols));

    for (i, im) in originals.iter().enumerate() {
        draw_image(&cells[i].margin(4, 4, 4, 4), im, im.range())?;
    }
    for (i, im) in filtered.iter().enumerate() {
        draw_image(&cells[cols + i].margin(4, 4, 4, 4), im, im.range())?;
    }
    // Kernel top-right, bottom-right left blank
    draw_image(&cells[cols - 1].margin(4, 4, 4, 4), kernel, kernel.range())?;

    root.present().map_err(draw_err)?;
    tracing::info!("Convolution preview written to '{}'", path.display());
    Ok(())
}

/// Render `images` in a single row on a shared intensity scale.
/// When `classes` is given, each cell is titled with its label's name.
pub fn display_dataset(images: &[Image], classes: Option<&[&str]>, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let n    = images.len().max(1);
    let size = (SAMPLES_ROW_HEIGHT / 2 * n as u32, SAMPLES_ROW_HEIGHT);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let range = joint_range(images);
    let cells = root.split_evenly((1, n));

    for (cell, im) in cells.iter().zip(images) {
        let title = classes.zip(im.label).and_then(|(names, l)| names.get(l).copied());
        let cell = match title {
            Some(t) => cell.titled(t, ("sans-serif", 20)).map_err(draw_err)?,
            None    => cell.clone(),
        };
        draw_image(&cell.margin(4, 4, 4, 4), im, range)?;
    }

    root.present().map_err(draw_err)?;
    tracing::info!("Dataset samples written to '{}'", path.display());
    Ok(())
}
