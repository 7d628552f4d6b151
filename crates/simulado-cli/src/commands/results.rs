//! The `simulado results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use simulado_core::model::option_letter;
use simulado_core::report::ExamReport;
use simulado_core::store::HandoffStore;
use simulado_report::html::write_html_report;

use super::{open_store, Paths};

pub fn execute(paths: &Paths, html: Option<PathBuf>, json: Option<PathBuf>) -> Result<()> {
    let config = paths.load_config()?;
    let Some(bundle) = HandoffStore::new(open_store(&config)).load() else {
        println!("Nenhum simulado concluído ainda.");
        println!("Run: simulado run --subject math");
        return Ok(());
    };
    if bundle.questions.is_empty() {
        println!("O último simulado não tem questões.");
        return Ok(());
    }

    let report = ExamReport::from_bundle(bundle)?;
    let summary = &report.summary;

    println!("{}", report.subject);
    println!(
        "{}% de acerto ({} de {})",
        summary.percentage, summary.correct_count, summary.total
    );
    println!("{}", summary.feedback.message());

    let mut table = Table::new();
    table.set_header(vec!["#", "Tópico", "Sua resposta", "Gabarito", "Tempo", ""]);
    for review in report.reviews() {
        let (answer, time) = match review.result {
            Some(r) => (
                option_letter(r.selected_option_index).to_string(),
                format!("{:.0}s", r.time_taken_seconds),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(review.index + 1),
            Cell::new(&review.question.topic),
            Cell::new(answer),
            Cell::new(option_letter(review.question.correct_index)),
            Cell::new(time),
            Cell::new(if review.is_correct() { "OK" } else { "X" }),
        ]);
    }
    println!("\n{table}");

    if summary.topics.len() > 1 {
        println!("\nPor tópico:");
        for topic in &summary.topics {
            println!("  {}: {}/{}", topic.topic, topic.correct, topic.total);
        }
    }

    if let Some(path) = html {
        write_html_report(&report, &path)?;
        eprintln!("HTML report: {}", path.display());
    }
    if let Some(path) = json {
        report.save_json(&path)?;
        eprintln!("Results saved to: {}", path.display());
    }

    Ok(())
}
