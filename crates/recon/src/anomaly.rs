//! Day-over-day impression drop detection per location.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::digest::group_thousands;
use crate::model::{AnomalyFinding, UnifiedColumn, UnifiedDataset};

/// A drop of 30% or more against the previous day is flagged.
pub const DEFAULT_DROP_THRESHOLD: f64 = 0.30;

/// Scan the unified dataset for relative impression drops.
///
/// Impressions are summed per (location, date) across campaigns, then each
/// location's series is walked in date order. A transition whose previous day
/// has no impressions is skipped. Findings come out ordered by location, then
/// date, and carry the mean rainfall for that day when any was reported.
///
/// Returns nothing when the dataset lacks impressions, location or date.
pub fn scan(unified: &UnifiedDataset, drop_threshold: f64) -> Vec<AnomalyFinding> {
    let required = [UnifiedColumn::Impressions, UnifiedColumn::Location, UnifiedColumn::Date];
    if !required.iter().all(|c| unified.has(*c)) {
        tracing::debug!("anomaly scan skipped, required columns absent");
        return Vec::new();
    }
    let has_rain = unified.has(UnifiedColumn::RainfallMm);

    let mut daily: BTreeMap<&str, BTreeMap<NaiveDate, i64>> = BTreeMap::new();
    let mut rain: BTreeMap<(&str, NaiveDate), (f64, usize)> = BTreeMap::new();

    for r in &unified.records {
        let (Some(location), Some(date)) = (r.location.as_deref(), r.date) else {
            continue;
        };
        let day = daily.entry(location).or_default().entry(date).or_insert(0);
        *day = day.saturating_add(r.impressions.unwrap_or(0));
        if let (true, Some(mm)) = (has_rain, r.rainfall_mm) {
            let slot = rain.entry((location, date)).or_insert((0.0, 0));
            slot.0 += mm;
            slot.1 += 1;
        }
    }

    let mut findings = Vec::new();
    for (location, series) in &daily {
        let days: Vec<(&NaiveDate, &i64)> = series.iter().collect();
        for pair in days.windows(2) {
            let (_, &previous) = pair[0];
            let (&date, &current) = pair[1];
            if previous <= 0 {
                continue;
            }
            let relative_change = (current as f64 - previous as f64) / previous as f64;
            if relative_change > -drop_threshold {
                continue;
            }
            let rainfall_mm = rain
                .get(&(*location, date))
                .map(|(sum, count)| sum / *count as f64);
            findings.push(AnomalyFinding {
                location: location.to_string(),
                date,
                drop_pct: -relative_change * 100.0,
                impressions_current: current,
                impressions_previous: previous,
                rainfall_mm,
            });
        }
    }

    tracing::debug!(findings = findings.len(), threshold = drop_threshold, "anomaly scan complete");
    findings
}

impl fmt::Display for AnomalyFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Traffic dropped {:.1}% in {} on {} (impressions {} vs {} previous day).",
            self.drop_pct,
            self.location,
            self.date,
            group_thousands(self.impressions_current),
            group_thousands(self.impressions_previous),
        )?;
        if let Some(mm) = self.rainfall_mm {
            write!(f, " Reported rainfall: {mm:.1}mm.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnifiedRecord;

    fn rec(loc: &str, date: &str, camp: &str, impressions: i64, rain: Option<f64>) -> UnifiedRecord {
        UnifiedRecord {
            date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
            campaign_id: Some(camp.into()),
            location: Some(loc.into()),
            impressions: Some(impressions),
            clicks: None,
            conversions: None,
            spend: None,
            temperature_c: None,
            rainfall_mm: rain,
            ctr: None,
            cpc: None,
            conversion_rate: None,
            cpa: None,
        }
    }

    fn series(loc: &str, values: &[i64]) -> Vec<UnifiedRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| rec(loc, &format!("2025-01-{:02}", i + 1), "CAMP01", *v, None))
            .collect()
    }

    #[test]
    fn exact_threshold_is_flagged() {
        let unified = UnifiedDataset::from_records(series("Delhi", &[100, 70]));
        let findings = scan(&unified, DEFAULT_DROP_THRESHOLD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].drop_pct, 30.0);
        assert_eq!(findings[0].impressions_previous, 100);
        assert_eq!(findings[0].impressions_current, 70);
    }

    #[test]
    fn just_under_threshold_is_not_flagged() {
        let unified = UnifiedDataset::from_records(series("Delhi", &[100, 71]));
        assert!(scan(&unified, DEFAULT_DROP_THRESHOLD).is_empty());
    }

    #[test]
    fn zero_previous_day_is_skipped() {
        let unified = UnifiedDataset::from_records(series("Delhi", &[0, 0, 50, 10]));
        let findings = scan(&unified, DEFAULT_DROP_THRESHOLD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].date, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
    }

    #[test]
    fn campaigns_are_summed_per_location_day() {
        let unified = UnifiedDataset::from_records(vec![
            rec("Delhi", "2025-01-01", "CAMP01", 60, None),
            rec("Delhi", "2025-01-01", "CAMP02", 40, None),
            rec("Delhi", "2025-01-02", "CAMP01", 50, None),
        ]);
        let findings = scan(&unified, DEFAULT_DROP_THRESHOLD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].impressions_previous, 100);
        assert_eq!(findings[0].drop_pct, 50.0);
    }

    #[test]
    fn findings_ordered_by_location_then_date() {
        let mut records = series("Pune", &[100, 10, 100, 10]);
        records.extend(series("Agra", &[100, 50]));
        let unified = UnifiedDataset::from_records(records);
        let findings = scan(&unified, DEFAULT_DROP_THRESHOLD);
        let order: Vec<(&str, u32)> = findings
            .iter()
            .map(|f| (f.location.as_str(), chrono::Datelike::day(&f.date)))
            .collect();
        assert_eq!(order, vec![("Agra", 2), ("Pune", 2), ("Pune", 4)]);
    }

    #[test]
    fn rainfall_is_averaged_or_omitted() {
        let unified = UnifiedDataset::from_records(vec![
            rec("Delhi", "2025-01-01", "CAMP01", 100, None),
            rec("Delhi", "2025-01-02", "CAMP01", 10, Some(10.0)),
            rec("Delhi", "2025-01-02", "CAMP02", 10, Some(14.0)),
            rec("Delhi", "2025-01-03", "CAMP01", 1, None),
        ]);
        let findings = scan(&unified, DEFAULT_DROP_THRESHOLD);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rainfall_mm, Some(12.0));
        assert_eq!(findings[1].rainfall_mm, None);
    }

    #[test]
    fn missing_location_column_yields_nothing() {
        let mut unified = UnifiedDataset::from_records(series("Delhi", &[100, 10]));
        unified.columns.remove(&UnifiedColumn::Location);
        assert!(scan(&unified, DEFAULT_DROP_THRESHOLD).is_empty());
    }

    #[test]
    fn extreme_impressions_do_not_overflow() {
        let mut records = series("Delhi", &[i64::MAX, 1]);
        records.push(rec("Delhi", "2025-01-01", "CAMP02", 1, None));
        records.push(rec("Delhi", "2025-01-02", "CAMP02", i64::MIN, None));
        let unified = UnifiedDataset::from_records(records);
        let findings = scan(&unified, DEFAULT_DROP_THRESHOLD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].impressions_previous, i64::MAX);
        assert!(findings[0].drop_pct.is_finite());
    }

    #[test]
    fn custom_threshold() {
        let unified = UnifiedDataset::from_records(series("Delhi", &[100, 85]));
        assert!(scan(&unified, DEFAULT_DROP_THRESHOLD).is_empty());
        assert_eq!(scan(&unified, 0.10).len(), 1);
    }

    #[test]
    fn sentence_rendering() {
        let finding = AnomalyFinding {
            location: "Mumbai".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            drop_pct: 42.268,
            impressions_current: 28_000,
            impressions_previous: 48_500,
            rainfall_mm: Some(9.5),
        };
        assert_eq!(
            finding.to_string(),
            "Traffic dropped 42.3% in Mumbai on 2025-01-05 (impressions 28,000 vs 48,500 previous day). Reported rainfall: 9.5mm."
        );

        let dry = AnomalyFinding { rainfall_mm: None, ..finding };
        assert!(dry.to_string().ends_with("previous day)."));
    }
}
