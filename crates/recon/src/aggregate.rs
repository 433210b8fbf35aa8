use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::schema::{ClickFrame, TrafficFrame, WeatherFrame};

/// Traffic grain: (date, campaign_id, location).
pub type TrafficKey = (Option<NaiveDate>, Option<String>, Option<String>);
/// Click grain: (date, campaign_id).
pub type ClickKey = (Option<NaiveDate>, Option<String>);
/// Weather grain: (date, location).
pub type WeatherKey = (Option<NaiveDate>, Option<String>);

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficAggregate {
    pub date: Option<NaiveDate>,
    pub campaign_id: Option<String>,
    pub location: Option<String>,
    pub impressions: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickAggregate {
    pub clicks: Option<i64>,
    pub conversions: Option<i64>,
    pub spend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherAggregate {
    pub temperature_c: Option<f64>,
    pub rainfall_mm: Option<f64>,
}

/// Running sum that stays `None` when the column is absent altogether.
/// Null cells inside a present column contribute nothing.
fn column_sum<T>(present: bool, zero: T) -> Option<T> {
    present.then_some(zero)
}

/// Summable measure. Counts saturate at the `i64` bounds instead of wrapping.
trait Measure: Copy {
    fn plus(self, other: Self) -> Self;
}

impl Measure for i64 {
    fn plus(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Measure for f64 {
    fn plus(self, other: Self) -> Self {
        self + other
    }
}

fn add<T: Measure>(acc: &mut Option<T>, value: Option<T>) {
    if let (Some(total), Some(v)) = (acc.as_mut(), value) {
        *total = total.plus(v);
    }
}

/// Group traffic by (date, campaign_id, location), summing impressions.
/// Output is ordered by key.
pub fn aggregate_traffic(frame: &TrafficFrame) -> Vec<TrafficAggregate> {
    let has_impressions = frame.has("impressions");
    let mut groups: BTreeMap<TrafficKey, Option<i64>> = BTreeMap::new();

    for rec in &frame.records {
        let key = (rec.date, rec.campaign_id.clone(), rec.location.clone());
        let entry = groups
            .entry(key)
            .or_insert_with(|| column_sum(has_impressions, 0));
        add(entry, rec.impressions);
    }

    groups
        .into_iter()
        .map(|((date, campaign_id, location), impressions)| TrafficAggregate {
            date,
            campaign_id,
            location,
            impressions,
        })
        .collect()
}

/// Group clicks by (date, campaign_id), summing clicks, conversions and spend.
pub fn aggregate_clicks(frame: &ClickFrame) -> BTreeMap<ClickKey, ClickAggregate> {
    let (has_clicks, has_conversions, has_spend) =
        (frame.has("clicks"), frame.has("conversions"), frame.has("spend"));
    let mut groups: BTreeMap<ClickKey, ClickAggregate> = BTreeMap::new();

    for rec in &frame.records {
        let entry = groups
            .entry((rec.date, rec.campaign_id.clone()))
            .or_insert_with(|| ClickAggregate {
                clicks: column_sum(has_clicks, 0),
                conversions: column_sum(has_conversions, 0),
                spend: column_sum(has_spend, 0.0),
            });
        add(&mut entry.clicks, rec.clicks);
        add(&mut entry.conversions, rec.conversions);
        add(&mut entry.spend, rec.spend);
    }

    groups
}

/// Group weather by (date, location): rainfall summed, temperature averaged
/// over non-null readings.
pub fn aggregate_weather(frame: &WeatherFrame) -> BTreeMap<WeatherKey, WeatherAggregate> {
    let has_rainfall = frame.has("rainfall_mm");
    let mut groups: BTreeMap<WeatherKey, (f64, usize, Option<f64>)> = BTreeMap::new();

    for rec in &frame.records {
        let entry = groups
            .entry((rec.date, rec.location.clone()))
            .or_insert_with(|| (0.0, 0, column_sum(has_rainfall, 0.0)));
        if let Some(t) = rec.temperature_c {
            entry.0 += t;
            entry.1 += 1;
        }
        add(&mut entry.2, rec.rainfall_mm);
    }

    groups
        .into_iter()
        .map(|(key, (temp_sum, temp_count, rainfall_mm))| {
            let temperature_c = (temp_count > 0).then(|| temp_sum / temp_count as f64);
            (key, WeatherAggregate { temperature_c, rainfall_mm })
        })
        .collect()
}
