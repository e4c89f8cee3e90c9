#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]
use crate::aggregate::DistributionResult;
use crate::error::{InventoryError, Result};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use plotters::prelude::*;

/// Label shown for the group of empty cells.
const EMPTY_LABEL: &str = "(vazio)";

/// Configuration options for chart generation
///
/// This structure contains the customizable properties of the distribution
/// bar chart.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Distribuição".to_string(),
            x_label: String::new(),
            y_label: "Quantidade".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl ChartOptions {
    /// Options titled after the charted column
    ///
    /// # Examples
    /// ```
    /// use inventario::graph::ChartOptions;
    ///
    /// let options = ChartOptions::for_column("Fabricante");
    /// assert_eq!(options.title, "Distribuição por Fabricante");
    /// assert_eq!(options.y_label, "Quantidade");
    /// ```
    pub fn for_column(column: &str) -> Self {
        Self {
            title: format!("Distribuição por {}", column),
            x_label: column.to_string(),
            ..Self::default()
        }
    }
}

/// Axis labels of the bars, in bar order. Empty values get a placeholder so
/// the bar stays identifiable.
pub fn bar_labels(dist: &DistributionResult) -> Vec<String> {
    dist.entries
        .iter()
        .map(|e| {
            if e.value.is_empty() {
                EMPTY_LABEL.to_string()
            } else {
                e.value.clone()
            }
        })
        .collect()
}

/// Renders a distribution as a PNG bar chart
///
/// One bar per entry, in the order of the distribution (most frequent
/// first), with the count on the Y-axis.
///
/// # Arguments
/// * `dist` - The distribution to draw
/// * `options` - Chart styling options
///
/// # Returns
/// * A Result containing the PNG image data as bytes or a `Chart` error
pub fn render_distribution(dist: &DistributionResult, options: &ChartOptions) -> Result<Vec<u8>> {
    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    draw_bars(dist, options, &mut buffer).map_err(|e| InventoryError::Chart {
        message: e.to_string(),
    })?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&buffer, width, height, image::ColorType::Rgb8)
        .map_err(|e| InventoryError::Chart {
            message: e.to_string(),
        })?;
    Ok(png)
}

fn draw_bars(
    dist: &DistributionResult,
    options: &ChartOptions,
    buffer: &mut [u8],
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buffer, (options.width, options.height))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let labels = bar_labels(dist);
    let bars = labels.len().max(1);
    let max_y = dist.max_count() + 1;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d((0..bars).into_segmented(), 0..max_y)?;

    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars)
        .x_label_formatter(&label_of)
        .x_desc(&options.x_label)
        .y_desc(&options.y_label)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .margin(10)
            .data(dist.entries.iter().enumerate().map(|(i, e)| (i, e.count))),
    )?;

    root.present()?;
    Ok(())
}
