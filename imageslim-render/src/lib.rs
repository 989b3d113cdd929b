//! Rendering helpers (markdown) for human-readable artifacts.

use imageslim_types::report::AnalyzeReport;

pub fn render_report_md(report: &AnalyzeReport) -> String {
    let mut out = String::new();
    out.push_str("# imageslim report\n\n");
    out.push_str(&format!(
        "- Spec: {} ({} stages, {} instructions)\n",
        report.spec.path.as_deref().unwrap_or("<inline>"),
        report.spec.stages,
        report.spec.instructions
    ));
    out.push_str(&format!("- Final base: `{}`\n", report.spec.final_base));
    out.push_str(&format!(
        "- Estimated size: **{}** (base {})\n\n",
        format_bytes(report.estimate.total_bytes as i64),
        format_bytes(report.estimate.base_image_bytes as i64)
    ));

    if !report.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for warning in &report.warnings {
            out.push_str(&format!("- `{}`: {}\n", warning.code, warning.message));
        }
        out.push('\n');
    }

    out.push_str("## Layers\n\n");
    for layer in &report.estimate.layers {
        out.push_str(&format!(
            "- `#{}` `{}` {}\n",
            layer.index,
            layer.instruction,
            format_bytes(layer.bytes)
        ));
    }
    out.push('\n');

    out.push_str("## Suggestions\n\n");
    if report.suggestions.is_empty() {
        out.push_str("_Nothing to suggest; the spec already looks lean._\n");
        return out;
    }

    for (i, suggestion) in report.suggestions.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, suggestion.rule_id));
        out.push_str(&format!("{}\n\n", suggestion.description));
        out.push_str(&format!(
            "- Estimated total: **{}** (saves {})\n",
            format_bytes(suggestion.estimated_total_bytes as i64),
            format_bytes(suggestion.savings_bytes as i64)
        ));
        for note in &suggestion.notes {
            out.push_str(&format!("- Note: {}\n", note));
        }
        if !suggestion.added_ignore_rules.is_empty() {
            out.push_str(&format!(
                "- Add to ignore file: {}\n",
                suggestion
                    .added_ignore_rules
                    .iter()
                    .map(|r| format!("`{r}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        out.push_str("\n```dockerfile\n");
        out.push_str(&suggestion.rewritten_spec);
        out.push_str("```\n\n");
    }

    out
}

/// Human-readable size, decimal units.
pub fn format_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let magnitude = bytes.unsigned_abs();
    if magnitude >= 1_000_000_000 {
        format!("{sign}{:.2} GB", magnitude as f64 / 1e9)
    } else if magnitude >= 1_000_000 {
        format!("{sign}{:.1} MB", magnitude as f64 / 1e6)
    } else if magnitude >= 1_000 {
        format!("{sign}{:.1} kB", magnitude as f64 / 1e3)
    } else {
        format!("{sign}{magnitude} B")
    }
}
