//! Plain-text weekly brief.

use std::fmt::Write;

use insight_recon::digest::{group_thousands, money, percent, rank_by};
use insight_recon::InsightResult;

/// Campaigns shown in the performance table, by spend.
const TOP_CAMPAIGN_ROWS: usize = 5;

pub fn render_text(result: &InsightResult) -> String {
    let mut out = String::new();
    let meta = &result.meta;
    let o = &result.overall;

    let _ = writeln!(out, "Weekly Performance Report: {}", meta.client_name);
    let _ = writeln!(out, "Reporting period: {} to {}", meta.week_start, meta.week_end);

    section(&mut out, "KEY METRICS");
    let metrics = [
        ("Impressions", group_thousands(o.total_impressions)),
        ("Clicks", group_thousands(o.total_clicks)),
        ("Conversions", group_thousands(o.total_conversions)),
        ("Spend", format!("{:.2}", o.total_spend)),
        ("CTR", percent(Some(o.overall_ctr))),
        ("CPC", format!("{:.2}", o.overall_cpc)),
        ("CVR", percent(Some(o.overall_cvr))),
        ("CPA", format!("{:.2}", o.overall_cpa)),
    ];
    for (label, value) in metrics {
        let _ = writeln!(out, "{label:<12}{value:>14}");
    }

    bullets(&mut out, "KEY HIGHLIGHTS", &result.digest.key_highlights);
    bullets(&mut out, "TOP WINS", &result.digest.top_wins);
    bullets(&mut out, "KEY CONCERNS", &result.digest.key_concerns);
    bullets(&mut out, "RECOMMENDATIONS", &result.digest.recommendations);

    section(&mut out, "CAMPAIGN INSIGHTS");
    let _ = writeln!(out, "{}", result.digest.campaign_insights);

    if !result.campaigns.is_empty() {
        section(&mut out, "CAMPAIGN PERFORMANCE");
        let _ = writeln!(
            out,
            "{:<12}{:>10}{:>8}{:>7}{:>10}{:>8}{:>8}{:>8}",
            "Campaign", "Impr.", "Clicks", "Conv.", "Spend", "CTR", "CPC", "CPA"
        );
        for c in rank_by(&result.campaigns, |c| Some(c.spend), true)
            .into_iter()
            .take(TOP_CAMPAIGN_ROWS)
        {
            let _ = writeln!(
                out,
                "{:<12}{:>10}{:>8}{:>7}{:>10.2}{:>8}{:>8}{:>8}",
                c.label(),
                group_thousands(c.impressions),
                group_thousands(c.clicks),
                group_thousands(c.conversions),
                c.spend,
                percent(c.ctr),
                money(c.cpc),
                money(c.cpa),
            );
        }
    }

    if !result.anomalies.is_empty() {
        let sentences: Vec<String> = result.anomalies.iter().map(|a| a.to_string()).collect();
        bullets(&mut out, "ANOMALY DETECTION", &sentences);
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn bullets(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    section(out, title);
    for line in lines {
        let _ = writeln!(out, "- {line}");
    }
}
