//! Report digest builders: talking points layered on top of the summaries.
//!
//! Every builder is a pure function of the overall and campaign summaries and
//! degrades to generic text when there are no campaigns.

use std::cmp::Ordering;

use crate::model::{CampaignSummary, OverallSummary, ReportDigest};

pub fn build_digest(overall: &OverallSummary, campaigns: &[CampaignSummary]) -> ReportDigest {
    ReportDigest {
        key_highlights: key_highlights(overall, campaigns),
        top_wins: top_wins(campaigns),
        key_concerns: key_concerns(campaigns),
        recommendations: recommendations(campaigns),
        campaign_insights: campaign_insights(campaigns),
    }
}

pub fn key_highlights(overall: &OverallSummary, campaigns: &[CampaignSummary]) -> Vec<String> {
    let mut out = vec![
        format!(
            "Campaigns delivered {} impressions, {} clicks and {} conversions this week.",
            group_thousands(overall.total_impressions),
            group_thousands(overall.total_clicks),
            group_thousands(overall.total_conversions),
        ),
        format!(
            "Overall CTR was {} with an average CPC of {:.2} and CPA of {:.2}.",
            percent(Some(overall.overall_ctr)),
            overall.overall_cpc,
            overall.overall_cpa,
        ),
    ];

    let Some(top_conv) = rank_by(campaigns, |c| Some(c.conversions as f64), true).first().copied() else {
        return out;
    };
    out.push(format!(
        "Top converting campaign: {} with {} conversions and a CPA of {}.",
        top_conv.label(),
        group_thousands(top_conv.conversions),
        money(top_conv.cpa),
    ));

    if let Some(top_ctr) = rank_by(campaigns, |c| c.ctr, true).first() {
        if top_ctr.campaign_id != top_conv.campaign_id {
            out.push(format!(
                "Best CTR: {} with CTR of {}.",
                top_ctr.label(),
                percent(top_ctr.ctr)
            ));
        }
    }

    if let Some(worst) = rank_by(campaigns, |c| c.cpa, true).first() {
        out.push(format!(
            "Key cost risk: {} has the highest CPA at {}.",
            worst.label(),
            money(worst.cpa)
        ));
    }

    out
}

pub fn top_wins(campaigns: &[CampaignSummary]) -> Vec<String> {
    if campaigns.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<String> = rank_by(campaigns, |c| Some(c.conversions as f64), true)
        .into_iter()
        .take(2)
        .map(|c| {
            format!(
                "{} delivered {} conversions at a CPA of {}, making it a strong driver of performance.",
                c.label(),
                group_thousands(c.conversions),
                money(c.cpa),
            )
        })
        .collect();

    if let Some(best) = rank_by(campaigns, |c| c.cpa, false).first() {
        out.push(format!(
            "{} achieved the lowest CPA at {}, indicating high efficiency.",
            best.label(),
            money(best.cpa)
        ));
    }
    out
}

pub fn key_concerns(campaigns: &[CampaignSummary]) -> Vec<String> {
    if campaigns.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<String> = rank_by(campaigns, |c| c.cpa, true)
        .into_iter()
        .take(2)
        .map(|c| {
            format!(
                "{} shows elevated CPA at {} with {} conversions, suggesting room for optimization.",
                c.label(),
                money(c.cpa),
                group_thousands(c.conversions),
            )
        })
        .collect();

    if let Some(low) = rank_by(campaigns, |c| Some(c.conversions as f64), false).first() {
        out.push(format!(
            "{} has the lowest conversion volume ({} conversions) and may require creative or targeting refresh.",
            low.label(),
            group_thousands(low.conversions),
        ));
    }
    out
}

pub fn recommendations(campaigns: &[CampaignSummary]) -> Vec<String> {
    if campaigns.is_empty() {
        return vec![
            "Increase data volume and tracking coverage to enable more granular optimization.".into(),
            "Test multiple creatives per campaign to identify winning variations.".into(),
        ];
    }

    let top_cvr = names(&rank_by(campaigns, |c| c.cvr, true), 2);
    let low_cpa = names(&rank_by(campaigns, |c| c.cpa, false), 2);
    let worst_cpa = names(&rank_by(campaigns, |c| c.cpa, true), 2);

    vec![
        format!(
            "Reallocate a portion of budget toward high-CVR campaigns ({top_cvr}) \
             and low-CPA campaigns ({low_cpa}) to scale efficient volume."
        ),
        format!(
            "Audit creatives, audiences and landing pages for higher-CPA campaigns ({worst_cpa}) \
             to reduce cost and improve conversion efficiency."
        ),
        "Introduce structured A/B tests on creatives and audience segments and evaluate performance \
         over the next 1-2 weeks before scaling further."
            .into(),
    ]
}

pub fn campaign_insights(campaigns: &[CampaignSummary]) -> String {
    if campaigns.is_empty() {
        return "Insufficient campaign-level data to generate detailed insights.".into();
    }
    let by_conv = names(&rank_by(campaigns, |c| Some(c.conversions as f64), true), 3);
    let by_spend = names(&rank_by(campaigns, |c| Some(c.spend), true), 3);
    format!(
        "The highest converting campaigns this week were {by_conv}, indicating strong alignment \
         between messaging, targeting and audience intent. From a budget allocation perspective, \
         {by_spend} absorbed the majority of spend. Monitoring their marginal returns will help \
         avoid diminishing performance as budgets scale."
    )
}

/// Campaigns ordered by `key`. Null keys always sort last; ties keep input
/// (campaign_id) order.
pub fn rank_by<F>(campaigns: &[CampaignSummary], key: F, descending: bool) -> Vec<&CampaignSummary>
where
    F: Fn(&CampaignSummary) -> Option<f64>,
{
    let mut ranked: Vec<&CampaignSummary> = campaigns.iter().collect();
    ranked.sort_by(|a, b| match (key(a), key(b)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
}

fn names(ranked: &[&CampaignSummary], n: usize) -> String {
    ranked
        .iter()
        .take(n)
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Ratio as a two-decimal percentage; "n/a" when null.
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".into(), |v| format!("{:.2}%", v * 100.0))
}

/// Two-decimal amount; "n/a" when null.
pub fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".into(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(id: &str, conversions: i64, spend: f64, ctr: Option<f64>, cvr: Option<f64>, cpa: Option<f64>) -> CampaignSummary {
        CampaignSummary {
            campaign_id: Some(id.into()),
            impressions: 1000,
            clicks: 100,
            conversions,
            spend,
            ctr,
            cpc: Some(1.0),
            cvr,
            cpa,
        }
    }

    fn overall() -> OverallSummary {
        OverallSummary {
            total_impressions: 1_234_567,
            total_clicks: 8_000,
            total_conversions: 400,
            total_spend: 5000.0,
            overall_ctr: 0.0065,
            overall_cpc: 0.6,
            overall_cvr: 0.05,
            overall_cpa: 12.5,
        }
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-48_500), "-48,500");
    }

    #[test]
    fn highlights_without_campaigns_are_generic() {
        let h = key_highlights(&overall(), &[]);
        assert_eq!(h.len(), 2);
        assert_eq!(
            h[0],
            "Campaigns delivered 1,234,567 impressions, 8,000 clicks and 400 conversions this week."
        );
        assert_eq!(h[1], "Overall CTR was 0.65% with an average CPC of 0.60 and CPA of 12.50.");
    }

    #[test]
    fn highlights_name_top_and_risk_campaigns() {
        let campaigns = vec![
            campaign("CAMP01", 10, 100.0, Some(0.02), Some(0.1), Some(10.0)),
            campaign("CAMP02", 30, 90.0, Some(0.01), Some(0.3), Some(3.0)),
            campaign("CAMP03", 0, 50.0, Some(0.05), Some(0.0), None),
        ];
        let h = key_highlights(&overall(), &campaigns);
        assert_eq!(h.len(), 5);
        assert!(h[2].starts_with("Top converting campaign: CAMP02 with 30 conversions"));
        assert_eq!(h[3], "Best CTR: CAMP03 with CTR of 5.00%.");
        // Null CPA ranks last, so CAMP01 carries the highest CPA.
        assert_eq!(h[4], "Key cost risk: CAMP01 has the highest CPA at 10.00.");
    }

    #[test]
    fn rank_puts_nulls_last_both_directions() {
        let campaigns = vec![
            campaign("A", 1, 1.0, None, None, None),
            campaign("B", 1, 1.0, None, None, Some(5.0)),
            campaign("C", 1, 1.0, None, None, Some(2.0)),
        ];
        let asc: Vec<&str> = rank_by(&campaigns, |c| c.cpa, false).iter().map(|c| c.label()).collect();
        let desc: Vec<&str> = rank_by(&campaigns, |c| c.cpa, true).iter().map(|c| c.label()).collect();
        assert_eq!(asc, vec!["C", "B", "A"]);
        assert_eq!(desc, vec!["B", "C", "A"]);
    }

    #[test]
    fn empty_campaigns_degrade_to_generic_text() {
        let digest = build_digest(&overall(), &[]);
        assert!(digest.top_wins.is_empty());
        assert!(digest.key_concerns.is_empty());
        assert_eq!(digest.recommendations.len(), 2);
        assert_eq!(
            digest.campaign_insights,
            "Insufficient campaign-level data to generate detailed insights."
        );
    }

    #[test]
    fn recommendations_list_campaign_groups() {
        let campaigns = vec![
            campaign("CAMP01", 10, 100.0, Some(0.02), Some(0.1), Some(10.0)),
            campaign("CAMP02", 30, 90.0, Some(0.01), Some(0.3), Some(3.0)),
            campaign("CAMP03", 5, 50.0, Some(0.05), Some(0.05), Some(10.0)),
        ];
        let recs = recommendations(&campaigns);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("high-CVR campaigns (CAMP02, CAMP01)"));
        assert!(recs[0].contains("low-CPA campaigns (CAMP02, CAMP01)"));
        assert!(recs[1].contains("(CAMP01, CAMP03)"));
    }

    #[test]
    fn wins_and_concerns() {
        let campaigns = vec![
            campaign("CAMP01", 10, 100.0, None, None, Some(10.0)),
            campaign("CAMP02", 30, 90.0, None, None, Some(3.0)),
        ];
        let wins = top_wins(&campaigns);
        assert_eq!(wins.len(), 3);
        assert!(wins[0].starts_with("CAMP02 delivered 30 conversions at a CPA of 3.00"));
        assert_eq!(wins[2], "CAMP02 achieved the lowest CPA at 3.00, indicating high efficiency.");

        let concerns = key_concerns(&campaigns);
        assert!(concerns[0].starts_with("CAMP01 shows elevated CPA at 10.00"));
        assert!(concerns[2].starts_with("CAMP01 has the lowest conversion volume (10 conversions)"));
    }
}
