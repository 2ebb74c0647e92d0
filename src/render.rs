//! Chart renderer: turns a `ChartModel` into PNG bytes.
//!
//! Everything here is mechanical; the models carry all the numbers, so no
//! aggregation logic may creep in.

use crate::model::{BarModel, ChartModel, ChartSpec, GroupedBarModel, HistogramModel, PieModel};
use crate::palette::ColorPalette;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;

pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 800,
            height: 600,
        }
    }
}

type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub fn render_chart(model: &ChartModel, config: &RenderConfig) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; (config.width * config.height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        match &model.spec {
            ChartSpec::Histogram(histogram) => draw_histogram(&root, &model.title, histogram)?,
            ChartSpec::Bar(bar) => draw_bar(&root, &model.title, bar)?,
            ChartSpec::Pie(pie) => draw_pie(&root, &model.title, pie)?,
            ChartSpec::GroupedBar(grouped) => draw_grouped_bar(&root, &model.title, grouped)?,
        }

        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                &buffer,
                config.width,
                config.height,
                image::ColorType::Rgb8,
            )
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn draw_histogram(root: &Root<'_>, title: &str, model: &HistogramModel) -> Result<()> {
    if model.bins.is_empty() {
        return Ok(());
    }

    let palette = ColorPalette::dashboard();
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(model.x_domain.0..model.x_domain.1, 0.0..model.y_max.max(1.0))
        .context("Failed to build histogram chart")?;

    chart
        .configure_mesh()
        .x_desc("Age")
        .y_desc("Number of participants")
        .draw()
        .context("Failed to draw histogram mesh")?;

    chart
        .draw_series(model.bins.iter().map(|bin| {
            let color = parse_color(palette.color(bin.color_index));
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                color.filled(),
            )
        }))
        .context("Failed to draw histogram bars")?;

    Ok(())
}

fn draw_bar(root: &Root<'_>, title: &str, model: &BarModel) -> Result<()> {
    if model.categories.is_empty() {
        return Ok(());
    }

    let palette = ColorPalette::dashboard();
    let n = model.categories.len();
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..model.y_max.max(1.0))
        .context("Failed to build bar chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(&model.categories, *x))
        .y_desc("Number of participants")
        .draw()
        .context("Failed to draw bar chart mesh")?;

    chart
        .draw_series(model.bars.iter().enumerate().map(|(i, bar)| {
            let color = parse_color(palette.color(bar.color_index));
            Rectangle::new(
                [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, bar.count as f64)],
                color.filled(),
            )
        }))
        .context("Failed to draw bars")?;

    Ok(())
}

fn draw_pie(root: &Root<'_>, title: &str, model: &PieModel) -> Result<()> {
    if model.total == 0 {
        return Ok(());
    }

    let palette = ColorPalette::dashboard();
    let root = root
        .titled(title, ("sans-serif", 20))
        .context("Failed to add pie title")?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.4;

    let sizes: Vec<f64> = model.slices.iter().map(|s| s.count as f64).collect();
    let colors: Vec<RGBColor> = model
        .slices
        .iter()
        .map(|s| parse_color(palette.color(s.color_index)))
        .collect();
    let labels: Vec<String> = model.slices.iter().map(|s| s.label.clone()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 12).into_font().color(&BLACK));
    root.draw(&pie).context("Failed to draw pie")?;

    Ok(())
}

fn draw_grouped_bar(root: &Root<'_>, title: &str, model: &GroupedBarModel) -> Result<()> {
    if model.primary_categories.is_empty() || model.secondary_categories.is_empty() {
        return Ok(());
    }

    let palette = ColorPalette::dashboard();
    let n_primary = model.primary_categories.len();
    let n_secondary = model.secondary_categories.len();
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n_primary as f64 - 0.5), 0.0..model.y_max.max(1.0))
        .context("Failed to build grouped bar chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n_primary)
        .x_label_formatter(&|x| category_label(&model.primary_categories, *x))
        .y_desc("Number of participants")
        .draw()
        .context("Failed to draw grouped bar mesh")?;

    // One series per secondary category so each gets a legend entry. Bars
    // within a primary group are dodged side by side.
    let slot = 0.8 / n_secondary as f64;
    for (s_idx, secondary) in model.secondary_categories.iter().enumerate() {
        let color_index = model
            .bars
            .iter()
            .find(|b| &b.secondary == secondary)
            .map(|b| b.color_index)
            .unwrap_or(s_idx);
        let color = parse_color(palette.color(color_index));
        let offset = (s_idx as f64 - (n_secondary as f64 - 1.0) / 2.0) * slot;

        let rects: Vec<Rectangle<(f64, f64)>> = model
            .bars
            .iter()
            .filter(|b| &b.secondary == secondary)
            .filter_map(|b| {
                let p_idx = model
                    .primary_categories
                    .iter()
                    .position(|p| p == &b.primary)?;
                let center = p_idx as f64 + offset;
                let half = slot * 0.45;
                Some(Rectangle::new(
                    [(center - half, 0.0), (center + half, b.count as f64)],
                    color.filled(),
                ))
            })
            .collect();

        chart
            .draw_series(rects)
            .context("Failed to draw grouped bars")?
            .label(secondary)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

/// Label the tick closest to an integer category position, nothing else.
fn category_label(categories: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < categories.len() {
        categories[i as usize].clone()
    } else {
        String::new()
    }
}

fn parse_color(hex: &str) -> RGBColor {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return RGBColor(r, g, b);
        }
    }
    RGBColor(128, 128, 128)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::build_models;
    use crate::dataset::SubjectRecord;

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn sample_records() -> Vec<SubjectRecord> {
        vec![
            SubjectRecord {
                age: Some(25),
                sex: "Male".to_string(),
                race: "A".to_string(),
                ethnicity: "Hispanic or Latino".to_string(),
            },
            SubjectRecord {
                age: Some(31),
                sex: "Female".to_string(),
                race: "B".to_string(),
                ethnicity: "Not Hispanic or Latino".to_string(),
            },
        ]
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#78D5D7"), RGBColor(0x78, 0xD5, 0xD7));
        assert_eq!(parse_color("bogus"), RGBColor(128, 128, 128));
    }

    #[test]
    fn test_category_label() {
        let categories = vec!["Male".to_string(), "Female".to_string()];
        assert_eq!(category_label(&categories, 0.0), "Male");
        assert_eq!(category_label(&categories, 1.0), "Female");
        assert_eq!(category_label(&categories, 0.5), "");
        assert_eq!(category_label(&categories, 2.0), "");
    }

    #[test]
    fn test_render_all_five_charts_to_png() {
        let models = build_models(&sample_records(), 2).unwrap();
        let config = RenderConfig {
            width: 400,
            height: 300,
        };
        for model in &models {
            let png = render_chart(model, &config).unwrap();
            assert!(is_valid_png(&png), "Chart '{}' is not a valid PNG", model.mount);
        }
    }

    #[test]
    fn test_render_empty_dataset_does_not_fail() {
        let models = build_models(&[], 5).unwrap();
        let config = RenderConfig::default();
        for model in &models {
            let png = render_chart(model, &config).unwrap();
            assert!(is_valid_png(&png));
        }
    }
}
