use std::fmt::Write;

use crate::connector::RunStats;

/// Render the human-readable summary printed after a successful run.
pub fn render_summary(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Successfully stored {} issues in the database",
        stats.fetched_count
    );
    let _ = writeln!(out, "Total issues in database: {}", stats.total_count);
    for (priority, count) in &stats.per_priority_counts {
        let _ = writeln!(out, "  {priority}: {count}");
    }
    out
}
