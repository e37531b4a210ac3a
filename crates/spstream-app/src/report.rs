// Plain-text and JSON rendering of an analysis result.

use std::fmt::Write;

use spstream_baseball::engine::{AnalysisResult, PitcherAnalysis};

const DATE_FMT: &str = "%a %b %-d";

pub fn format_ownership(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.0}%"),
        None => "n/a".to_string(),
    }
}

fn format_starts(p: &PitcherAnalysis) -> String {
    p.starts
        .iter()
        .map(|s| {
            format!(
                "{} {} {}",
                s.game_date.format(DATE_FMT),
                s.home_or_away.matchup_prefix(),
                s.opponent
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_group(out: &mut String, title: &str, pitchers: &[PitcherAnalysis]) {
    let _ = writeln!(out, "{title} ({})", pitchers.len());
    if pitchers.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for p in pitchers {
        let marker = if p.is_potential_second_start { "**" } else { "  " };
        let _ = writeln!(
            out,
            "{marker}{:<28} {:<6} {:<5} {:>5}  {}",
            p.player.name,
            p.player.positions_display(),
            p.player.mlb_team.as_deref().unwrap_or("-"),
            format_ownership(p.player.percent_owned),
            format_starts(p)
        );
        let _ = writeln!(out, "    {}", p.recommendation_note);
        if let Some(next) = p.projected_second_start {
            let _ = writeln!(out, "    Rotation turn projected for {}", next.format(DATE_FMT));
        }
        if let Some(url) = &p.savant_url {
            let _ = writeln!(out, "    {url}");
        }
    }
}

/// Human-readable report for the terminal.
pub fn render(result: &AnalysisResult) -> String {
    let week = &result.fantasy_week;
    let mut out = String::new();

    let targets = week
        .target_dates
        .iter()
        .map(|d| d.format(DATE_FMT).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        "Week {} ({} - {}), targets: {}",
        week.week_number,
        week.start_date.format(DATE_FMT),
        week.end_date.format(DATE_FMT),
        targets
    );
    let _ = writeln!(
        out,
        "Generated {}, {} pitcher(s) found",
        result.generated_at.format("%Y-%m-%d %H:%M UTC"),
        result.total_found
    );
    let _ = writeln!(out);

    if result.is_empty() {
        let _ = writeln!(
            out,
            "No confirmed starts on target days yet. Probable pitchers are usually announced a few days ahead."
        );
        return out;
    }

    write_group(&mut out, "MY ROSTER", result.rostered());
    let _ = writeln!(out);
    write_group(&mut out, "WAIVER WIRE", result.waiver());
    out
}

pub fn render_json(result: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}
