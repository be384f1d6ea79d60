use crate::dataset::DemandSource;
use crate::domain::{category::ShowCategory, demand::AggregatedDemand, month::Month};
use crate::errors::DomainError;
use crate::reference::ReferenceTables;

/// Averages month-level demand over every dataset row matching a category's keywords.
pub struct DemandAggregator<'a, S: ?Sized> {
    source: &'a S,
    tables: &'a ReferenceTables,
}

impl<'a, S: DemandSource + ?Sized> DemandAggregator<'a, S> {
    pub fn new(source: &'a S, tables: &'a ReferenceTables) -> Self {
        Self { source, tables }
    }

    pub fn aggregate(
        &self,
        category: &ShowCategory,
        city: &str,
        month: Month,
    ) -> Result<AggregatedDemand, DomainError> {
        aggregate_demand(self.source, self.tables, category, city, month)
    }
}

pub fn aggregate_demand<S: DemandSource + ?Sized>(
    source: &S,
    tables: &ReferenceTables,
    category: &ShowCategory,
    city: &str,
    month: Month,
) -> Result<AggregatedDemand, DomainError> {
    let keywords = tables
        .keywords(category)
        .ok_or_else(|| DomainError::UnknownCategory(category.to_string()))?;

    let rows = source.query(keywords, month);
    // Each keyword-month row counts once; keywords with several rows weigh more.
    let (avg_demand_index, avg_trend_score) = if rows.is_empty() {
        (0.0, 0.0)
    } else {
        let count = rows.len() as f64;
        let demand_sum: f64 = rows.iter().map(|row| row.demand_index).sum();
        let trend_sum: f64 = rows.iter().map(|row| row.trend_score).sum();
        (demand_sum / count, trend_sum / count)
    };

    let city_multiplier = tables.city_multiplier(city);
    let aggregated = AggregatedDemand {
        avg_demand_index,
        avg_trend_score,
        city_multiplier,
        city_adjusted_demand: avg_demand_index * city_multiplier,
        matched_records: rows.len(),
    };

    tracing::debug!(
        event_name = "forecast.demand.aggregated",
        category = %category,
        city,
        month = month.label(),
        matched_records = aggregated.matched_records,
        avg_demand_index = aggregated.avg_demand_index,
        city_adjusted_demand = aggregated.city_adjusted_demand,
        "demand aggregated"
    );

    Ok(aggregated)
}

#[cfg(test)]
mod tests {
    use super::{aggregate_demand, DemandAggregator};
    use crate::dataset::DemandDataset;
    use crate::domain::{category::ShowCategory, demand::DemandRecord, month::Month};
    use crate::errors::DomainError;
    use crate::reference::ReferenceTables;

    fn record(keyword: &str, month: u8, demand_index: f64, trend_score: f64) -> DemandRecord {
        DemandRecord { keyword: keyword.to_string(), month, demand_index, trend_score }
    }

    fn dataset() -> DemandDataset {
        DemandDataset::new(vec![
            record("Coldplay India: (India)", 3, 90.0, 2.0),
            record("Coldplay India: (India)", 3, 50.0, 1.0),
            record("Sunburn Festival: (India)", 3, 40.0, -1.0),
            record("Zakir Khan: (India)", 3, 10.0, 0.5),
            record("Coldplay India: (India)", 4, 100.0, 3.0),
        ])
    }

    #[test]
    fn averages_are_unweighted_across_matching_rows() {
        let tables = ReferenceTables::default();
        let data = dataset();

        let demand =
            aggregate_demand(&data, &tables, &ShowCategory::from("Concert"), "Ahmedabad", Month::Mar)
                .expect("concert is a known category");

        assert_eq!(demand.matched_records, 3);
        assert!((demand.avg_demand_index - 60.0).abs() < 1e-9);
        assert!((demand.avg_trend_score - (2.0 / 3.0)).abs() < 1e-9);
        assert!((demand.city_adjusted_demand - 60.0).abs() < 1e-9);
    }

    #[test]
    fn city_multiplier_scales_adjusted_demand() {
        let tables = ReferenceTables::default();
        let data = dataset();
        let aggregator = DemandAggregator::new(&data, &tables);

        let demand = aggregator
            .aggregate(&ShowCategory::from("Concert"), "Mumbai", Month::Mar)
            .expect("concert is a known category");

        assert_eq!(demand.city_multiplier, 1.30);
        assert!((demand.city_adjusted_demand - 78.0).abs() < 1e-9);
    }

    #[test]
    fn no_matching_rows_yields_zero_not_nan() {
        let tables = ReferenceTables::default();
        let data = dataset();

        for month in Month::ALL.into_iter().filter(|month| *month != Month::Mar) {
            let demand =
                aggregate_demand(&data, &tables, &ShowCategory::from("Standup"), "Mumbai", month)
                    .expect("standup is a known category");

            assert_eq!(demand.matched_records, 0);
            assert_eq!(demand.avg_demand_index, 0.0);
            assert_eq!(demand.avg_trend_score, 0.0);
            assert_eq!(demand.city_adjusted_demand, 0.0);
        }
    }

    #[test]
    fn unknown_city_is_neutral() {
        let tables = ReferenceTables::default();
        let data = dataset();

        let demand =
            aggregate_demand(&data, &tables, &ShowCategory::from("Concert"), "Atlantis", Month::Apr)
                .expect("concert is a known category");

        assert_eq!(demand.city_multiplier, 1.00);
        assert!((demand.city_adjusted_demand - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let tables = ReferenceTables::default();
        let data = dataset();

        let error =
            aggregate_demand(&data, &tables, &ShowCategory::from("Opera"), "Mumbai", Month::Mar)
                .expect_err("opera is not in the reference tables");

        assert_eq!(error, DomainError::UnknownCategory("Opera".to_string()));
    }
}
