//! SVG chart renderer
//!
//! Price line, SMA overlay and volume bars for a [`ChartSnapshot`]. An empty
//! snapshot renders a loading ring instead of a chart. No text is drawn, so
//! no font backend is needed.

use super::{ChartError, ChartSnapshot};
use crate::config::ChartConfig;
use plotters::coord::Shift;
use plotters::prelude::*;
use rust_decimal::Decimal;
use std::path::Path;

const BACKGROUND: RGBColor = RGBColor(15, 23, 42);
const RISING: RGBColor = RGBColor(16, 185, 129);
const FALLING: RGBColor = RGBColor(239, 68, 68);
const SMA: RGBColor = RGBColor(139, 92, 246);
const VOLUME: RGBColor = RGBColor(16, 185, 129);

/// Renders snapshots to SVG documents
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
    axis_padding: Decimal,
}

impl SvgChartRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            width: config.width.max(1),
            height: config.height.max(4),
            axis_padding: config.axis_padding,
        }
    }

    /// Render `snapshot` to an SVG string
    pub fn render(&self, snapshot: &ChartSnapshot) -> Result<String, ChartError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&BACKGROUND).map_err(render_error)?;

            if snapshot.points.is_empty() {
                self.draw_loading(&root)?;
            } else {
                self.draw_chart(&root, snapshot)?;
            }

            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }

    /// Render `snapshot` and write the SVG to `path`
    pub fn render_to_file(&self, snapshot: &ChartSnapshot, path: impl AsRef<Path>) -> Result<(), ChartError> {
        let svg = self.render(snapshot)?;
        std::fs::write(path, svg)?;
        Ok(())
    }

    fn draw_loading<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), ChartError> {
        let center = ((self.width / 2) as i32, (self.height / 2) as i32);
        root.draw(&Circle::new(center, 16, RISING.stroke_width(3)))
            .map_err(render_error)?;
        Ok(())
    }

    fn draw_chart<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        snapshot: &ChartSnapshot,
    ) -> Result<(), ChartError> {
        let points = &snapshot.points;
        let (upper, lower) = root.split_vertically((self.height * 3 / 4) as i32);

        let Some(domain) = snapshot.price_domain(self.axis_padding) else {
            return Ok(());
        };
        let y_min = to_f64(domain.min);
        // zero padding on a flat series would collapse the axis
        let y_max = if domain.span() > Decimal::ZERO {
            to_f64(domain.max)
        } else {
            y_min + 1.0
        };
        let x_max = points.len().max(2) as f64 - 1.0;

        let line_color = if snapshot.is_positive() { RISING } else { FALLING };

        let mut price_chart = ChartBuilder::on(&upper)
            .margin(10)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(render_error)?;

        price_chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.index as f64, to_f64(p.sma))),
                SMA.stroke_width(1),
            ))
            .map_err(render_error)?;

        price_chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.index as f64, to_f64(p.price))),
                line_color.stroke_width(2),
            ))
            .map_err(render_error)?;

        let (_, max_volume) = snapshot.volume_domain().unwrap_or((0, 1));
        let mut volume_chart = ChartBuilder::on(&lower)
            .margin(10)
            .build_cartesian_2d(-0.5f64..x_max + 0.5, 0f64..max_volume.max(1) as f64)
            .map_err(render_error)?;

        volume_chart
            .draw_series(points.iter().map(|p| {
                let x = p.index as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, p.volume as f64)], VOLUME.mix(0.3).filled())
            }))
            .map_err(render_error)?;

        Ok(())
    }
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::new(&ChartConfig::default())
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.try_into().unwrap_or(0.0)
}

fn render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}
