//! Plain-text rendering of the views. Every function returns a `String` so the
//! caller decides where it goes.

use crate::app::views::{DashboardView, SubjectCard, SubjectDetailView};
use crate::core::insights::format_number;
use crate::core::stats::{format_percent, TrendPoint};
use crate::domain::model::{InsightData, COLOR_PALETTE};
use crate::utils::error::TrackerError;

const BAR_WIDTH: usize = 20;

// 每行一個元素，最後以換行結尾
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn code_suffix(code: Option<&str>) -> String {
    code.map(|c| format!(" ({})", c)).unwrap_or_default()
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut lines = vec![
        "Academic Overview".to_string(),
        String::new(),
        format!(
            "Overall GPA Estimate  {}  (across {} subjects)",
            format_percent(view.overall_average),
            view.subject_count
        ),
        format!("Total Assessments     {}", view.total_assessments),
        format!(
            "Highest Performing    {}",
            view.highest_performing.as_deref().unwrap_or("—")
        ),
        String::new(),
    ];

    if view.cards.is_empty() {
        lines.push("No subjects yet. Add one with `scholartrack add-subject <name>`.".to_string());
    } else {
        lines.push("Your Subjects".to_string());
        lines.extend(view.cards.iter().flat_map(subject_card));
    }

    if view.insights_available {
        lines.push(String::new());
        lines.push("Run `scholartrack insights` for AI coaching.".to_string());
    }
    finish(lines)
}

fn subject_card(card: &SubjectCard) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  [{}] {}{}  {}  id={}",
            card.initials(),
            card.name,
            code_suffix(card.code.as_deref()),
            card.color,
            card.id
        ),
        format!(
            "       {} of target {}%  {}{}",
            format_percent(card.percentage),
            format_number(card.target_score),
            card.status.label(),
            if card.passing { "" } else { " (below passing)" }
        ),
    ];
    if !card.recent.is_empty() {
        let recent: Vec<String> = card
            .recent
            .iter()
            .map(|p| format!("{:.0}", p.percentage))
            .collect();
        lines.push(format!("       recent: {}", recent.join(" ")));
    }
    lines
}

pub fn subject_detail(view: &SubjectDetailView) -> String {
    let mut lines = vec![
        format!(
            "{}{}  {}  id={}",
            view.name,
            code_suffix(view.code.as_deref()),
            view.color,
            view.id
        ),
        format!(
            "Current {}  Target {}%  Credits {}  {}",
            format_percent(view.percentage),
            format_number(view.target_score),
            view.credits,
            view.status.label()
        ),
        String::new(),
        "Performance Trend".to_string(),
    ];
    if view.trend.is_empty() {
        lines.push("  (no data)".to_string());
    }
    lines.extend(view.trend.iter().map(|p| trend_line(p, view.target_score)));
    lines.push(String::new());

    lines.push(format!("History  {} entries", view.history.len()));
    if view.history.is_empty() {
        lines.push("  No scores recorded yet. Add your first score to start tracking!".to_string());
    }
    for entry in &view.history {
        lines.push(format!(
            "  {}  {:<10} {:<24} {}/{}  {} {}  id={}",
            entry.date,
            entry.kind,
            entry.title,
            format_number(entry.obtained),
            format_number(entry.total),
            format_percent(entry.percentage),
            if entry.meets_target { "✓" } else { "!" },
            entry.id
        ));
        if let Some(notes) = &entry.notes {
            lines.push(format!("      {}", notes));
        }
    }
    finish(lines)
}

fn trend_line(point: &TrendPoint, target: f64) -> String {
    let filled = ((point.percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    // 目標 100% 時仍要落在最後一格
    let marker = (((target.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize)
        .min(BAR_WIDTH - 1);
    let bar: String = (0..BAR_WIDTH)
        .map(|i| match (i < filled, i == marker) {
            (_, true) => '|',
            (true, false) => '#',
            (false, false) => '.',
        })
        .collect();
    format!(
        "  {}  {}  {:>5.1}%  {}",
        point.date.format("%b %d"),
        bar,
        point.percentage,
        point.title
    )
}

pub fn insights(data: &InsightData) -> String {
    let mut lines = vec![
        "AI Academic Coach".to_string(),
        String::new(),
        "Summary".to_string(),
        format!("  {}", data.summary),
        String::new(),
        "Strengths".to_string(),
    ];
    lines.extend(data.strengths.iter().map(|s| format!("  • {}", s)));
    lines.push(String::new());
    lines.push("Focus Areas".to_string());
    lines.extend(data.weaknesses.iter().map(|w| format!("  • {}", w)));
    lines.push(String::new());
    lines.push("Actionable Study Tips".to_string());
    lines.extend(
        data.tips
            .iter()
            .enumerate()
            .map(|(i, tip)| format!("  {}. {}", i + 1, tip)),
    );
    finish(lines)
}

/// Shown in place of insight results; always names the retry action.
pub fn insight_failure(error: &TrackerError) -> String {
    format!(
        "{}\nTry Again: run `scholartrack insights`\n",
        error.user_friendly_message()
    )
}

pub fn palette() -> String {
    COLOR_PALETTE
        .iter()
        .map(|c| format!("{}\n", c))
        .collect()
}
