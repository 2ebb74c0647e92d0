//! Render-ready chart models.
//!
//! Pure transforms from aggregate results into the structures a renderer
//! needs: domain bounds, the values to plot, and a color key per
//! category/bin index. No drawing concepts appear here, and every model is
//! serializable so it can be tested without a drawing step.

use crate::aggregate::{nice_ceil, CategoryCount, CrossTab, Histogram};
use crate::palette::ColorPalette;
use serde::Serialize;

/// A chart model tagged with the mount point the renderer attaches it to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub mount: String,
    pub title: String,
    #[serde(flatten)]
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartSpec {
    Histogram(HistogramModel),
    Bar(BarModel),
    Pie(PieModel),
    GroupedBar(GroupedBarModel),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramModel {
    /// Numeric x-axis bounds covering every bin.
    pub x_domain: (f64, f64),
    /// Nice upper bound for the y-axis.
    pub y_max: f64,
    pub bins: Vec<HistogramBar>,
    /// Records left out of the binning for an unparseable age.
    pub excluded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBar {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub color_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarModel {
    /// Categorical x-axis domain, in plot order.
    pub categories: Vec<String>,
    pub y_max: f64,
    pub bars: Vec<CategoryBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBar {
    pub label: String,
    pub count: usize,
    pub color_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieModel {
    pub total: usize,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
    pub color_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarModel {
    pub primary_categories: Vec<String>,
    pub secondary_categories: Vec<String>,
    pub y_max: f64,
    pub bars: Vec<GroupedBar>,
    /// Records whose secondary value fell outside the fixed category list.
    pub untabulated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBar {
    pub primary: String,
    pub secondary: String,
    pub count: usize,
    /// Keyed by the secondary (legend) category index.
    pub color_index: usize,
}

impl HistogramModel {
    pub fn from_histogram(histogram: &Histogram) -> Self {
        let palette = ColorPalette::dashboard();
        let x_domain = match (histogram.bins.first(), histogram.bins.last()) {
            (Some(first), Some(last)) => (first.lower, last.upper),
            _ => (0.0, 0.0),
        };
        let max_count = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0);
        HistogramModel {
            x_domain,
            y_max: nice_ceil(max_count as f64),
            bins: histogram
                .bins
                .iter()
                .enumerate()
                .map(|(i, bin)| HistogramBar {
                    lower: bin.lower,
                    upper: bin.upper,
                    count: bin.count,
                    color_index: palette.color_index(i),
                })
                .collect(),
            excluded: histogram.excluded,
        }
    }
}

impl BarModel {
    pub fn from_counts(counts: &[CategoryCount]) -> Self {
        let palette = ColorPalette::dashboard();
        BarModel {
            categories: counts.iter().map(|c| c.category.clone()).collect(),
            y_max: counts.iter().map(|c| c.count).max().unwrap_or(0) as f64,
            bars: counts
                .iter()
                .enumerate()
                .map(|(i, c)| CategoryBar {
                    label: c.category.clone(),
                    count: c.count,
                    color_index: palette.color_index(i),
                })
                .collect(),
        }
    }
}

impl PieModel {
    pub fn from_counts(counts: &[CategoryCount]) -> Self {
        let palette = ColorPalette::dashboard();
        let total: usize = counts.iter().map(|c| c.count).sum();
        PieModel {
            total,
            slices: counts
                .iter()
                .enumerate()
                .map(|(i, c)| PieSlice {
                    label: c.category.clone(),
                    count: c.count,
                    fraction: if total == 0 {
                        0.0
                    } else {
                        c.count as f64 / total as f64
                    },
                    color_index: palette.color_index(i),
                })
                .collect(),
        }
    }
}

impl GroupedBarModel {
    pub fn from_cross_tab(cross: &CrossTab) -> Self {
        let palette = ColorPalette::dashboard();
        let max_count = cross.cells.iter().map(|c| c.count).max().unwrap_or(0);
        let secondary_index = |secondary: &str| {
            cross
                .secondary_categories
                .iter()
                .position(|s| s == secondary)
                .unwrap_or(0)
        };
        GroupedBarModel {
            primary_categories: cross.primary_categories.clone(),
            secondary_categories: cross.secondary_categories.clone(),
            y_max: nice_ceil(max_count as f64),
            bars: cross
                .cells
                .iter()
                .map(|cell| GroupedBar {
                    primary: cell.primary.clone(),
                    secondary: cell.secondary.clone(),
                    count: cell.count,
                    color_index: palette.color_index(secondary_index(&cell.secondary)),
                })
                .collect(),
            untabulated: cross.untabulated,
        }
    }
}
