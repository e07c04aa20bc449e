use serde::Serialize;

use crate::core::ProjectionResult;

/// Two year-indexed series ready for a line or bar chart. The browser owns the
/// chart object and replaces its data with this on every recalculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub name: &'static str,
    pub values: Vec<f64>,
}

impl From<&ProjectionResult> for ChartData {
    fn from(result: &ProjectionResult) -> Self {
        let points = &result.yearly_series;
        Self {
            labels: points.iter().map(|p| format!("Year {}", p.year)).collect(),
            series: vec![
                ChartSeries {
                    name: "contributed",
                    values: points.iter().map(|p| p.cumulative_contributed).collect(),
                },
                ChartSeries {
                    name: "value",
                    values: points.iter().map(|p| p.cumulative_value).collect(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project_step_up_contribution;

    #[test]
    fn chart_has_one_label_and_value_per_year() {
        let result = project_step_up_contribution(5_000.0, 4, 10.0, 5.0).expect("valid plan");
        let chart = ChartData::from(&result);

        assert_eq!(chart.labels, vec!["Year 1", "Year 2", "Year 3", "Year 4"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "contributed");
        assert_eq!(chart.series[1].name, "value");
        assert_eq!(
            chart.series[0].values.last().copied(),
            Some(result.total_contributed)
        );
        assert_eq!(
            chart.series[1].values.last().copied(),
            Some(result.maturity_value)
        );
    }
}
