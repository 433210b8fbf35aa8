use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{aggregate_clicks, aggregate_traffic, aggregate_weather};
use crate::model::{UnifiedColumn, UnifiedDataset, UnifiedRecord};
use crate::ratio::{ratio, ratio_i};
use crate::schema::{ClickFrame, Frame, Record, TrafficFrame, WeatherFrame};

/// Aggregate the three datasets to their grains and left-join them into one
/// unified dataset keyed by traffic.
///
/// Every (date, campaign_id, location) triple in traffic yields exactly one
/// record. Click fields are null when no click aggregate shares the
/// (date, campaign_id); weather fields are null when no weather aggregate
/// shares the (date, location).
pub fn reconcile(traffic: &TrafficFrame, clicks: &ClickFrame, weather: &WeatherFrame) -> UnifiedDataset {
    let mut missing_columns = BTreeMap::new();
    report_missing(traffic, &mut missing_columns);
    report_missing(clicks, &mut missing_columns);
    report_missing(weather, &mut missing_columns);

    let traffic_aggs = aggregate_traffic(traffic);
    let click_aggs = aggregate_clicks(clicks);
    let weather_aggs = aggregate_weather(weather);

    tracing::debug!(
        traffic_groups = traffic_aggs.len(),
        click_groups = click_aggs.len(),
        weather_groups = weather_aggs.len(),
        "aggregated inputs"
    );

    let mut records = Vec::with_capacity(traffic_aggs.len());
    for t in traffic_aggs {
        let click = click_aggs.get(&(t.date, t.campaign_id.clone()));
        let wx = weather_aggs.get(&(t.date, t.location.clone()));

        let mut record = UnifiedRecord {
            date: t.date,
            campaign_id: t.campaign_id,
            location: t.location,
            impressions: t.impressions,
            clicks: click.and_then(|c| c.clicks),
            conversions: click.and_then(|c| c.conversions),
            spend: click.and_then(|c| c.spend),
            temperature_c: wx.and_then(|w| w.temperature_c),
            rainfall_mm: wx.and_then(|w| w.rainfall_mm),
            ctr: None,
            cpc: None,
            conversion_rate: None,
            cpa: None,
        };
        derive_ratios(&mut record);
        records.push(record);
    }

    tracing::info!(rows = records.len(), "reconciliation complete");

    UnifiedDataset {
        columns: present_columns(traffic, clicks, weather),
        missing_columns,
        records,
    }
}

/// Fill the four row-level ratios. Zero or null denominators give null.
pub fn derive_ratios(record: &mut UnifiedRecord) {
    record.ctr = ratio_i(record.clicks, record.impressions);
    record.cpc = ratio(record.spend, record.clicks.map(|c| c as f64));
    record.conversion_rate = ratio_i(record.conversions, record.clicks);
    record.cpa = ratio(record.spend, record.conversions.map(|c| c as f64));
}

fn report_missing<R: Record>(frame: &Frame<R>, out: &mut BTreeMap<String, Vec<String>>) {
    if frame.missing.is_empty() {
        return;
    }
    tracing::warn!(
        dataset = frame.dataset(),
        missing = %frame.missing.join(", "),
        "dataset is missing columns, continuing with the columns present"
    );
    out.insert(
        frame.dataset().to_string(),
        frame.missing.iter().map(|c| c.to_string()).collect(),
    );
}

fn present_columns(traffic: &TrafficFrame, clicks: &ClickFrame, weather: &WeatherFrame) -> BTreeSet<UnifiedColumn> {
    let sources = [
        (UnifiedColumn::Date, traffic.has("date")),
        (UnifiedColumn::CampaignId, traffic.has("campaign_id")),
        (UnifiedColumn::Location, traffic.has("location")),
        (UnifiedColumn::Impressions, traffic.has("impressions")),
        (UnifiedColumn::Clicks, clicks.has("clicks")),
        (UnifiedColumn::Conversions, clicks.has("conversions")),
        (UnifiedColumn::Spend, clicks.has("spend")),
        (UnifiedColumn::TemperatureC, weather.has("temperature_c")),
        (UnifiedColumn::RainfallMm, weather.has("rainfall_mm")),
        (UnifiedColumn::Ctr, true),
        (UnifiedColumn::Cpc, true),
        (UnifiedColumn::ConversionRate, true),
        (UnifiedColumn::Cpa, true),
    ];
    sources
        .into_iter()
        .filter_map(|(col, present)| present.then_some(col))
        .collect()
}
