use crate::dataset::SubjectRecord;
use crate::error::AggregationError;
use std::collections::HashMap;

/// A contiguous half-open age interval `[lower, upper)` with its record
/// count. The last bin of a histogram is closed at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Binned ages plus the number of records excluded for an unparseable age.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    pub excluded: usize,
}

/// One distinct value of a categorical field and its record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// One (primary, secondary) cell of a cross-tabulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTabCount {
    pub primary: String,
    pub secondary: String,
    pub count: usize,
}

/// Full cross product of observed primary categories and the caller-fixed
/// secondary list, zero-filled. `untabulated` counts records whose secondary
/// value fell outside the fixed list; totals may exceed the sum of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTab {
    pub primary_categories: Vec<String>,
    pub secondary_categories: Vec<String>,
    pub cells: Vec<CrossTabCount>,
    pub untabulated: usize,
}

/// Selects a categorical field of `SubjectRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Sex,
    Race,
    Ethnicity,
}

impl CategoryField {
    pub fn value<'a>(&self, record: &'a SubjectRecord) -> &'a str {
        match self {
            Self::Sex => &record.sex,
            Self::Race => &record.race,
            Self::Ethnicity => &record.ethnicity,
        }
    }
}

/// Snap a positive value down to the nearest `k * 10^p`, `k` in {1, 2, 5}.
/// Zero stays zero.
pub fn nice_floor(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let power = x.log10().floor() as i32;
    let base = 10f64.powi(power);
    let mantissa = x / base;
    let k = if mantissa >= 5.0 {
        5.0
    } else if mantissa >= 2.0 {
        2.0
    } else {
        1.0
    };
    k * base
}

/// Snap a positive value up to the nearest `k * 10^p`, `k` in {1, 2, 5}.
pub fn nice_ceil(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let power = x.log10().floor() as i32;
    let base = 10f64.powi(power);
    let mantissa = x / base;
    let k = if mantissa <= 1.0 {
        1.0
    } else if mantissa <= 2.0 {
        2.0
    } else if mantissa <= 5.0 {
        5.0
    } else {
        10.0
    };
    k * base
}

/// Bin ages into up to `desired_bins` equal-width bins aligned to nice
/// boundaries. Records without a parsed age are excluded and counted in
/// `Histogram::excluded`; an age equal to the top boundary of the last bin
/// lands in the last bin rather than being dropped.
pub fn compute_histogram(
    records: &[SubjectRecord],
    desired_bins: usize,
) -> Result<Histogram, AggregationError> {
    if desired_bins == 0 {
        return Err(AggregationError::InvalidBinCount);
    }

    let ages: Vec<u32> = records.iter().filter_map(|r| r.age).collect();
    let excluded = records.len() - ages.len();
    if ages.is_empty() {
        return Ok(Histogram {
            bins: Vec::new(),
            excluded,
        });
    }

    let min = f64::from(*ages.iter().min().unwrap());
    let max = f64::from(*ages.iter().max().unwrap());

    let lower = nice_floor(min);
    let width = if max > lower {
        nice_ceil((max - lower) / desired_bins as f64)
    } else {
        1.0
    };
    let bin_count = (((max - lower) / width).ceil() as usize).max(1);

    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|i| Bin {
            lower: lower + i as f64 * width,
            upper: lower + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for age in ages {
        let idx = ((f64::from(age) - lower) / width).floor() as usize;
        // Top edge of the domain belongs to the last bin.
        let idx = idx.min(bin_count - 1);
        bins[idx].count += 1;
    }

    Ok(Histogram { bins, excluded })
}

/// Group records by a categorical field, one count per distinct value in
/// first-encountered order. The sum of counts equals the record total.
pub fn compute_category_counts(
    records: &[SubjectRecord],
    field: CategoryField,
) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let value = field.value(record);
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value.to_string(), counts.len());
                counts.push(CategoryCount {
                    category: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// Count records for every (primary, secondary) pair. Primary categories
/// are derived from the data in first-encountered order; the secondary set
/// is fixed by the caller. Missing pairs are materialized with count 0 so
/// every group has uniform shape.
pub fn compute_cross_tab(
    records: &[SubjectRecord],
    primary: CategoryField,
    secondary: CategoryField,
    secondary_categories: &[String],
) -> Result<CrossTab, AggregationError> {
    if secondary_categories.is_empty() {
        return Err(AggregationError::EmptySecondaryCategories);
    }

    let secondary_index: HashMap<&str, usize> = secondary_categories
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let mut primaries: Vec<String> = Vec::new();
    let mut primary_index: HashMap<String, usize> = HashMap::new();
    let mut grid: Vec<Vec<usize>> = Vec::new();
    let mut untabulated = 0;

    for record in records {
        let value = primary.value(record);
        let row = match primary_index.get(value) {
            Some(&i) => i,
            None => {
                primary_index.insert(value.to_string(), primaries.len());
                primaries.push(value.to_string());
                grid.push(vec![0; secondary_categories.len()]);
                primaries.len() - 1
            }
        };

        match secondary_index.get(secondary.value(record)) {
            Some(&col) => grid[row][col] += 1,
            None => untabulated += 1,
        }
    }

    let mut cells = Vec::with_capacity(primaries.len() * secondary_categories.len());
    for (row, primary_category) in primaries.iter().enumerate() {
        for (col, secondary_category) in secondary_categories.iter().enumerate() {
            cells.push(CrossTabCount {
                primary: primary_category.clone(),
                secondary: secondary_category.clone(),
                count: grid[row][col],
            });
        }
    }

    Ok(CrossTab {
        primary_categories: primaries,
        secondary_categories: secondary_categories.to_vec(),
        cells,
        untabulated,
    })
}
