//! PNG charts of measurement tables.
//!
//! Background and sample tables are drawn as a 3x2 grid of quantities
//! against end time; the net table as two panels against elapsed time.

use crate::constants::columns;
use crate::models::{MeasurementRow, MeasurementTable, NetTable};
use chrono::{DateTime, NaiveDateTime};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const GRID_SIZE: (u32, u32) = (1200, 900);
const NET_SIZE: (u32, u32) = (800, 600);
const MARKER_SIZE: u32 = 3;
const END_TIME_LABEL: &str = "%m-%d %H:%M";

/// One subplot: a y-axis label and one or more named series
struct Panel<'a> {
    y_label: &'a str,
    series: Vec<(&'a str, Vec<(f64, f64)>)>,
}

impl<'a> Panel<'a> {
    fn single(y_label: &'a str, points: Vec<(f64, f64)>) -> Self {
        Self {
            y_label,
            series: vec![("", points)],
        }
    }
}

/// Draw a background or sample table to a PNG file
pub fn plot_measurements(table: &MeasurementTable, output_path: &Path) -> Result<()> {
    if table.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "No {} measurements to plot",
            table.kind().name()
        )));
    }

    let rows = table.rows();
    let points = |value: &dyn Fn(&MeasurementRow) -> f64| -> Vec<(f64, f64)> {
        rows.iter()
            .map(|row| (timestamp(row.reading.end_time), value(row)))
            .collect()
    };

    let panels = [
        Panel::single(columns::COUNT_RATE, points(&|row| row.reading.count_rate)),
        Panel::single(columns::DEAD_TIME, points(&|row| row.reading.dead_time)),
        Panel::single(columns::REAL_TIME, points(&|row| row.reading.real_time)),
        Panel::single(columns::LIVE_TIME, points(&|row| row.live_time)),
        Panel {
            y_label: columns::COUNTS,
            series: vec![
                ("Measured", points(&|row| row.reading.counts_reading as f64)),
                ("Calculated", points(&|row| row.counts)),
            ],
        },
        Panel::single(
            columns::COUNTS_UNCERTAINTY_PCT,
            points(&|row| row.counts_uncertainty_pct),
        ),
    ];

    let title = format!("{} measurements", capitalize(table.kind().name()));
    draw_grid(
        output_path,
        GRID_SIZE,
        &title,
        (3, 2),
        &panels,
        columns::END_TIME,
        &format_end_time,
    )?;

    debug!("Plotted {} rows to {}", rows.len(), output_path.display());
    Ok(())
}

/// Draw a net table to a PNG file
pub fn plot_net(table: &NetTable, output_path: &Path) -> Result<()> {
    if table.is_empty() {
        return Err(PlotError::InvalidData(
            "No net measurements to plot".to_string(),
        ));
    }

    let rows = table.rows();
    let panels = [
        Panel::single(
            columns::COUNTS,
            rows.iter()
                .map(|row| (row.elapsed_in_unit, row.counts))
                .collect(),
        ),
        Panel::single(
            columns::COUNTS_UNCERTAINTY_PCT,
            rows.iter()
                .map(|row| (row.elapsed_in_unit, row.counts_uncertainty_pct))
                .collect(),
        ),
    ];

    let x_label = columns::elapsed_time_in(table.unit().symbol());
    draw_grid(
        output_path,
        NET_SIZE,
        "Net quantities measurements",
        (2, 1),
        &panels,
        &x_label,
        &|x: &f64| format!("{:.2}", x),
    )?;

    debug!("Plotted {} net rows to {}", rows.len(), output_path.display());
    Ok(())
}

fn draw_grid(
    output_path: &Path,
    size: (u32, u32),
    title: &str,
    layout: (usize, usize),
    panels: &[Panel<'_>],
    x_label: &str,
    x_format: &dyn Fn(&f64) -> String,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let body = root
        .titled(title, ("sans-serif", 30))
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    for (area, panel) in body.split_evenly(layout).iter().zip(panels) {
        draw_panel(area, panel, x_label, x_format)?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

fn draw_panel(
    area: &Area<'_>,
    panel: &Panel<'_>,
    x_label: &str,
    x_format: &dyn Fn(&f64) -> String,
) -> Result<()> {
    let all_points = || panel.series.iter().flat_map(|(_, points)| points.iter());
    let x_range = padded_range(all_points().map(|(x, _)| *x));
    let y_range = padded_range(all_points().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(panel.y_label)
        .x_labels(4)
        .x_label_formatter(x_format)
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let palette = [BLUE, RED];
    for ((name, points), color) in panel.series.iter().zip(palette) {
        let series = chart
            .draw_series(LineSeries::new(points.iter().copied(), color))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        if !name.is_empty() {
            series
                .label(*name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .draw_series(
                points
                    .iter()
                    .map(|point| Circle::new(*point, MARKER_SIZE, color.filled())),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    if panel.series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    Ok(())
}

/// Data range with a margin, widened when all values coincide
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (min.abs() * 0.05).max(1.0)
    };
    (min - pad)..(max + pad)
}

fn timestamp(time: NaiveDateTime) -> f64 {
    time.and_utc().timestamp() as f64
}

fn format_end_time(x: &f64) -> String {
    DateTime::from_timestamp(*x as i64, 0)
        .map(|time| time.format(END_TIME_LABEL).to_string())
        .unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
