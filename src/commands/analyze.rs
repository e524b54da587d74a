//! Transcript analysis command
//!
//! Wires configuration into an engine, an inference client and an analyst,
//! runs the three tasks and renders the result as text or JSON.

use crate::adapters::llama::LlamaServerEngine;
use crate::config::AnalyzeArgs;
use crate::domain::models::{ActionItem, MeetingAnalysis};
use crate::error::Result;
use crate::services::analyst::Analyst;
use crate::services::inference::InferenceClient;
use crate::utils::transcript::read_transcript;
use std::sync::Arc;
use std::time::Duration;

/// Run a full analysis and print it to stdout
pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let config = &args.config;
    config.validate()?;

    let transcript = read_transcript(&args.transcript).await?;

    let model_settings = config.model_settings();
    let engine = match config.spawn_options()? {
        Some(options) => LlamaServerEngine::spawn(&options).await?,
        None => LlamaServerEngine::connect(
            &config.server_url,
            Duration::from_secs(config.request_timeout_secs),
        )?,
    };
    let client = Arc::new(InferenceClient::new(model_settings, engine)?);
    let analyst = Analyst::new(client, config.analyst_settings());

    let analysis = analyst.analyze(&transcript).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", render_text(&analysis));
    }
    Ok(())
}

/// Render an analysis as prose, an enumerated list and a table
pub fn render_text(analysis: &MeetingAnalysis) -> String {
    let mut out = String::new();

    out.push_str("SUMMARY\n");
    if analysis.summary.is_empty() {
        out.push_str("  No summary produced.\n");
    } else {
        for line in analysis.summary.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    out.push_str("\nKEY DECISIONS\n");
    if analysis.decisions.is_empty() {
        out.push_str("  No decisions found.\n");
    } else {
        for (i, decision) in analysis.decisions.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, decision));
        }
    }

    out.push_str("\nACTION ITEMS\n");
    if analysis.action_items.is_empty() {
        out.push_str("  No action items found.\n");
    } else {
        out.push_str(&render_table(&analysis.action_items));
    }

    out
}

fn render_table(items: &[ActionItem]) -> String {
    let headers = ["Task", "Owner", "Deadline"];
    let rows: Vec<[&str; 3]> = items
        .iter()
        .map(|i| [i.task.as_str(), i.owner.as_str(), i.deadline.as_str()])
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        format!("  {}\n", padded.join(" | ").trim_end())
    };

    let mut table = format_row(headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    table.push_str(&format!("  {}\n", rule.join("-+-")));
    for row in rows {
        table.push_str(&format_row(row));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_analysis() {
        let analysis = MeetingAnalysis::new(
            "- Launch moved to Q3\n- Team is upbeat".to_string(),
            vec!["Adopt new logo".to_string(), "Delay launch to Q3".to_string()],
            vec![
                ActionItem::new("Finalize report", "Alice", "EOD Friday"),
                ActionItem::new("Book venue", "Team", "Not specified"),
            ],
        );
        let text = render_text(&analysis);
        assert!(text.contains("  - Launch moved to Q3\n"));
        assert!(text.contains("  1. Adopt new logo\n  2. Delay launch to Q3\n"));
        assert!(text.contains("  Task            | Owner | Deadline\n"));
        assert!(text.contains("  Finalize report | Alice | EOD Friday\n"));
        assert!(text.contains("  Book venue      | Team  | Not specified\n"));
    }

    #[test]
    fn test_render_empty_analysis() {
        let analysis = MeetingAnalysis::new(String::new(), Vec::new(), Vec::new());
        let text = render_text(&analysis);
        assert!(text.contains("No summary produced."));
        assert!(text.contains("No decisions found."));
        assert!(text.contains("No action items found."));
    }

    #[test]
    fn test_table_rule_matches_widths() {
        let table = render_table(&[ActionItem::new("ab", "c", "d")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "  Task | Owner | Deadline");
        assert_eq!(lines[1], "  -----+-------+---------");
        assert_eq!(lines[2], "  ab   | c     | d");
    }
}
