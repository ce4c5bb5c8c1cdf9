//! PNG bar chart of one metric across currencies.
//!
//! Sized at 72 dpi: two inches of width per bar (minimum two bars wide) by
//! ten inches tall. Axis labels and descriptions need the `ttf` feature;
//! without it the chart is drawn with bars and grid only.

use super::ExportError;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const PX_PER_BAR: u32 = 144;
const CHART_HEIGHT: u32 = 720;

/// Label areas are only reserved when a font backend is compiled in; plotters
/// cannot rasterize text without one.
fn label_area(size: u32) -> u32 {
    if cfg!(feature = "ttf") {
        size
    } else {
        0
    }
}

/// Draw `series` as a vertical bar chart and save it to `output_file`.
///
/// Bars are drawn in the order given. The image format follows the file
/// extension (normally `.png`).
pub fn render_bar_chart(
    series: &[(String, f64)],
    y_desc: &str,
    output_file: &Path,
) -> Result<(), ExportError> {
    if series.is_empty() {
        return Err(ExportError::EmptySeries);
    }

    let width = PX_PER_BAR * (series.len() as u32).max(2);
    let (bottom, top) = value_range(series);
    let labels: Vec<&str> = series.iter().map(|(label, _)| label.as_str()).collect();

    let root = BitMapBackend::new(output_file, (width, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(label_area(60))
        .y_label_area_size(label_area(80))
        .build_cartesian_2d((0..series.len()).into_segmented(), bottom..top)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Currency")
        .y_desc(y_desc)
        .x_labels(series.len())
        .x_label_formatter(&|x: &SegmentValue<usize>| match x {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.filled())
                .margin(10)
                .data(series.iter().enumerate().map(|(i, (_, v))| (i, *v))),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;

    info!(path = %output_file.display(), bars = series.len(), "wrote bar chart");
    Ok(())
}

/// Y range covering every bar and the zero baseline, with 5% headroom.
fn value_range(series: &[(String, f64)]) -> (f64, f64) {
    let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let min = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let top = if max > 0.0 { max * 1.05 } else { 1.0 };
    let bottom = if min < 0.0 { min * 1.05 } else { 0.0 };
    (bottom, top)
}

fn chart_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Chart(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("tickerlab_plot_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_png() {
        let dir = temp_dir();
        let out = dir.join("prices.png");
        let series = vec![
            ("bitcoin".to_string(), 6400.0),
            ("ethereum".to_string(), 210.5),
            ("ripple".to_string(), 0.45),
        ];

        render_bar_chart(&series, "Price (USD)", &out).unwrap();

        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_series_is_rejected() {
        let dir = temp_dir();
        let out = dir.join("empty.png");

        let err = render_bar_chart(&[], "Price (USD)", &out).unwrap_err();
        assert!(matches!(err, ExportError::EmptySeries));
        assert!(!out.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn range_includes_zero_and_negatives() {
        let series = vec![("a".to_string(), -2.0), ("b".to_string(), 4.0)];
        let (bottom, top) = value_range(&series);
        assert!(bottom < -2.0);
        assert!(top > 4.0);

        let flat = vec![("a".to_string(), 0.0)];
        assert_eq!(value_range(&flat), (0.0, 1.0));
    }
}
