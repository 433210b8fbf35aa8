use std::collections::BTreeMap;

use crate::model::{CampaignSummary, OverallSummary, UnifiedDataset};
use crate::ratio::{ratio, ratio_or_zero};

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    impressions: i64,
    clicks: i64,
    conversions: i64,
    spend: f64,
}

impl Totals {
    fn add(&mut self, impressions: Option<i64>, clicks: Option<i64>, conversions: Option<i64>, spend: Option<f64>) {
        self.impressions = self.impressions.saturating_add(impressions.unwrap_or(0));
        self.clicks = self.clicks.saturating_add(clicks.unwrap_or(0));
        self.conversions = self.conversions.saturating_add(conversions.unwrap_or(0));
        self.spend += spend.unwrap_or(0.0);
    }
}

/// Roll the unified dataset up to overall totals and per-campaign summaries.
///
/// Nulls count as zero when summing; counts saturate at the `i64` bounds. Overall ratios fall back to 0.0 on a
/// zero denominator; campaign ratios are null instead. Campaigns come out
/// ordered by campaign_id.
pub fn summarize(unified: &UnifiedDataset) -> (OverallSummary, Vec<CampaignSummary>) {
    let mut overall = Totals::default();
    let mut by_campaign: BTreeMap<Option<&str>, Totals> = BTreeMap::new();

    for r in &unified.records {
        overall.add(r.impressions, r.clicks, r.conversions, r.spend);
        by_campaign
            .entry(r.campaign_id.as_deref())
            .or_default()
            .add(r.impressions, r.clicks, r.conversions, r.spend);
    }

    let campaigns = by_campaign
        .into_iter()
        .map(|(campaign_id, t)| {
            let (impressions, clicks, conversions) =
                (t.impressions as f64, t.clicks as f64, t.conversions as f64);
            CampaignSummary {
                campaign_id: campaign_id.map(str::to_string),
                impressions: t.impressions,
                clicks: t.clicks,
                conversions: t.conversions,
                spend: t.spend,
                ctr: ratio(Some(clicks), Some(impressions)),
                cpc: ratio(Some(t.spend), Some(clicks)),
                cvr: ratio(Some(conversions), Some(clicks)),
                cpa: ratio(Some(t.spend), Some(conversions)),
            }
        })
        .collect::<Vec<_>>();

    let overall = OverallSummary {
        total_impressions: overall.impressions,
        total_clicks: overall.clicks,
        total_conversions: overall.conversions,
        total_spend: overall.spend,
        overall_ctr: ratio_or_zero(overall.clicks as f64, overall.impressions as f64),
        overall_cpc: ratio_or_zero(overall.spend, overall.clicks as f64),
        overall_cvr: ratio_or_zero(overall.conversions as f64, overall.clicks as f64),
        overall_cpa: ratio_or_zero(overall.spend, overall.conversions as f64),
    };

    tracing::debug!(campaigns = campaigns.len(), "summarized metrics");

    (overall, campaigns)
}
