//! The pipeline: typed records in, five tagged chart models out.

use crate::aggregate::{
    compute_category_counts, compute_cross_tab, compute_histogram, CategoryField,
};
use crate::dataset::SubjectRecord;
use crate::error::AggregationError;
use crate::model::{BarModel, ChartModel, ChartSpec, GroupedBarModel, HistogramModel, PieModel};

/// The fixed ethnicity taxonomy for the race-by-ethnicity chart.
pub const ETHNICITY_CATEGORIES: [&str; 2] = ["Hispanic or Latino", "Not Hispanic or Latino"];

/// Build the five chart models of the dashboard from an immutable record
/// sequence. Each aggregate is computed independently from the same input;
/// nothing here mutates shared state.
pub fn build_models(
    records: &[SubjectRecord],
    desired_bins: usize,
) -> Result<Vec<ChartModel>, AggregationError> {
    let ethnicity_categories: Vec<String> =
        ETHNICITY_CATEGORIES.iter().map(|s| s.to_string()).collect();

    let histogram = compute_histogram(records, desired_bins)?;
    let sex_counts = compute_category_counts(records, CategoryField::Sex);
    let race_counts = compute_category_counts(records, CategoryField::Race);
    let ethnicity_counts = compute_category_counts(records, CategoryField::Ethnicity);
    let cross_tab = compute_cross_tab(
        records,
        CategoryField::Race,
        CategoryField::Ethnicity,
        &ethnicity_categories,
    )?;

    Ok(vec![
        ChartModel {
            mount: "histogram".to_string(),
            title: "Age distribution".to_string(),
            spec: ChartSpec::Histogram(HistogramModel::from_histogram(&histogram)),
        },
        ChartModel {
            mount: "barchart".to_string(),
            title: "Participants by sex".to_string(),
            spec: ChartSpec::Bar(BarModel::from_counts(&sex_counts)),
        },
        ChartModel {
            mount: "piechart".to_string(),
            title: "Participants by race".to_string(),
            spec: ChartSpec::Pie(PieModel::from_counts(&race_counts)),
        },
        ChartModel {
            mount: "piechart2".to_string(),
            title: "Participants by ethnicity".to_string(),
            spec: ChartSpec::Pie(PieModel::from_counts(&ethnicity_counts)),
        },
        ChartModel {
            mount: "raceEthnicityChart".to_string(),
            title: "Race by ethnicity".to_string(),
            spec: ChartSpec::GroupedBar(GroupedBarModel::from_cross_tab(&cross_tab)),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: Option<u32>, sex: &str, race: &str, ethnicity: &str) -> SubjectRecord {
        SubjectRecord {
            age,
            sex: sex.to_string(),
            race: race.to_string(),
            ethnicity: ethnicity.to_string(),
        }
    }

    #[test]
    fn test_five_models_with_expected_mounts() {
        let records = vec![
            record(Some(25), "Male", "A", "Hispanic or Latino"),
            record(Some(31), "Female", "B", "Not Hispanic or Latino"),
        ];
        let models = build_models(&records, 5).unwrap();
        let mounts: Vec<&str> = models.iter().map(|m| m.mount.as_str()).collect();
        assert_eq!(
            mounts,
            vec!["histogram", "barchart", "piechart", "piechart2", "raceEthnicityChart"]
        );
    }

    #[test]
    fn test_empty_input_still_yields_five_models() {
        let models = build_models(&[], 5).unwrap();
        assert_eq!(models.len(), 5);
        match &models[0].spec {
            ChartSpec::Histogram(h) => assert!(h.bins.is_empty()),
            other => panic!("Expected histogram, got {other:?}"),
        }
        match &models[2].spec {
            ChartSpec::Pie(p) => assert_eq!(p.total, 0),
            other => panic!("Expected pie, got {other:?}"),
        }
    }

    #[test]
    fn test_record_without_age_counts_everywhere_but_histogram() {
        let records = vec![
            record(Some(25), "Male", "A", "Hispanic or Latino"),
            record(None, "Female", "A", "Hispanic or Latino"),
        ];
        let models = build_models(&records, 5).unwrap();

        match &models[0].spec {
            ChartSpec::Histogram(h) => {
                assert_eq!(h.excluded, 1);
                let binned: usize = h.bins.iter().map(|b| b.count).sum();
                assert_eq!(binned, 1);
            }
            other => panic!("Expected histogram, got {other:?}"),
        }
        match &models[1].spec {
            ChartSpec::Bar(b) => {
                let total: usize = b.bars.iter().map(|bar| bar.count).sum();
                assert_eq!(total, 2);
            }
            other => panic!("Expected bar, got {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let records = vec![
            record(Some(25), "Male", "A", "Hispanic or Latino"),
            record(Some(31), "Female", "B", "Not Hispanic or Latino"),
            record(Some(44), "Female", "A", "unknown"),
        ];
        let first = build_models(&records, 5).unwrap();
        let second = build_models(&records, 5).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
