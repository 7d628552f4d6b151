//! HTML results page generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use simulado_core::model::option_letter;
use simulado_core::report::{ExamReport, QuestionReview};
use simulado_core::statistics::Feedback;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn feedback_class(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Excellent => "excellent",
        Feedback::Good => "good",
        Feedback::NeedsReinforcement => "reinforce",
    }
}

/// Format seconds as `m:ss`.
fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Generate the results page for a finished exam.
pub fn generate_html(report: &ExamReport) -> String {
    let summary = &report.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Resultado do simulado — {}</title>\n",
        html_escape(&report.subject.to_string())
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Resultado do simulado</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} questões | {}</p>\n",
        html_escape(&report.subject.to_string()),
        summary.total,
        report.created_at.format("%d/%m/%Y %H:%M UTC")
    ));
    html.push_str("</header>\n");

    // Score
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&generate_donut(summary.correct_count, summary.incorrect_count, summary.percentage));
    html.push_str(&format!(
        "<p class=\"feedback {}\">{}</p>\n",
        feedback_class(summary.feedback),
        html_escape(summary.feedback.message())
    ));

    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Acertos</th><th>Erros</th><th>Aproveitamento</th><th>Tempo total</th><th>Tempo médio</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td></tr></tbody>\n",
        summary.correct_count,
        summary.incorrect_count,
        summary.percentage,
        format_duration(summary.total_time_seconds),
        format_duration(summary.average_time_seconds),
    ));
    html.push_str("</table>\n");
    html.push_str("</section>\n");

    // Per-topic breakdown
    if !summary.topics.is_empty() {
        html.push_str("<section class=\"topics\">\n");
        html.push_str("<h2>Por tópico</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Tópico</th><th>Acertos</th></tr></thead>\n<tbody>\n");
        for topic in &summary.topics {
            let class = if topic.correct == topic.total { "pass" } else { "fail" };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}/{}</td></tr>\n",
                class,
                html_escape(&topic.topic),
                topic.correct,
                topic.total
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    // Question review
    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Revisão</h2>\n");
    html.push_str("<label><input type=\"checkbox\" id=\"only-wrong\" onchange=\"toggleWrong(this.checked)\"> Mostrar apenas erros</label>\n");
    for review in report.reviews() {
        html.push_str(&render_review(&review));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Dados brutos (JSON)</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn render_review(review: &QuestionReview<'_>) -> String {
    let question = review.question;
    let status = if review.is_correct() { "pass" } else { "fail" };
    let mut out = format!(
        "<article class=\"question {status}\">\n<h3>Questão {} <span class=\"topic\">{}</span></h3>\n",
        review.index + 1,
        html_escape(&question.topic)
    );
    out.push_str(&format!(
        "<p class=\"statement\">{}</p>\n<ol class=\"options\">\n",
        html_escape(&question.statement)
    ));

    let selected = review.result.map(|r| r.selected_option_index);
    for (i, option) in question.options.iter().enumerate() {
        let mut classes = Vec::new();
        if i == question.correct_index {
            classes.push("correct");
        }
        if selected == Some(i) {
            classes.push("chosen");
        }
        out.push_str(&format!(
            "<li class=\"{}\"><strong>{})</strong> {}</li>\n",
            classes.join(" "),
            option_letter(i),
            html_escape(option)
        ));
    }
    out.push_str("</ol>\n");

    match review.result {
        Some(result) => out.push_str(&format!(
            "<p class=\"meta\">Sua resposta: {} | Gabarito: {} | {:.0}s</p>\n",
            option_letter(result.selected_option_index),
            option_letter(question.correct_index),
            result.time_taken_seconds
        )),
        None => out.push_str(&format!(
            "<p class=\"meta\">Sem resposta | Gabarito: {}</p>\n",
            option_letter(question.correct_index)
        )),
    }

    out.push_str("<details>\n<summary>Explicação</summary>\n");
    out.push_str(&format!(
        "<div class=\"explanation\">{}</div>\n",
        html_escape(&question.explanation)
    ));
    out.push_str("</details>\n</article>\n");
    out
}

/// Write the results page to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

/// Ring chart of correct vs. incorrect answers with the percentage inside.
fn generate_donut(correct: usize, incorrect: usize, percentage: u32) -> String {
    let radius = 70.0_f64;
    let circumference = 2.0 * std::f64::consts::PI * radius;
    let answered = correct + incorrect;
    let correct_len = if answered == 0 {
        0.0
    } else {
        circumference * correct as f64 / answered as f64
    };

    let mut svg = String::from(
        "<svg width=\"200\" height=\"200\" viewBox=\"0 0 200 200\" xmlns=\"http://www.w3.org/2000/svg\">\n",
    );
    svg.push_str(&format!(
        "  <circle cx=\"100\" cy=\"100\" r=\"{radius}\" fill=\"none\" stroke=\"#ef4444\" stroke-width=\"24\"/>\n"
    ));
    svg.push_str(&format!(
        "  <circle cx=\"100\" cy=\"100\" r=\"{radius}\" fill=\"none\" stroke=\"#22c55e\" stroke-width=\"24\" stroke-dasharray=\"{correct_len:.2} {circumference:.2}\" transform=\"rotate(-90 100 100)\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"100\" y=\"100\" font-size=\"32\" font-weight=\"bold\" fill=\"currentColor\" text-anchor=\"middle\" dominant-baseline=\"middle\">{percentage}%</text>\n"
    ));
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --accent: #2563eb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --accent: #60a5fa; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; padding: 2rem; max-width: 960px; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.dashboard { text-align: center; }
.feedback { font-size: 1.4rem; font-weight: bold; }
.feedback.excellent { color: #16a34a; }
.feedback.good { color: var(--accent); }
.feedback.reinforce { color: #dc2626; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.question { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; margin: 1rem 0; }
.question.pass, .question.fail { background: none; border-left-width: 6px; }
.question.pass { border-left-color: #22c55e; }
.question.fail { border-left-color: #ef4444; }
.topic { font-size: 0.8rem; font-weight: normal; color: #6b7280; margin-left: 0.5rem; }
.statement { white-space: pre-wrap; }
.options { list-style: none; padding: 0; }
.options li { padding: 0.3rem 0.5rem; border-radius: 4px; }
.options li.correct { background: var(--pass); }
.options li.chosen:not(.correct) { background: var(--fail); }
.options li.chosen { outline: 2px solid var(--accent); }
.explanation { white-space: pre-wrap; padding: 0.5rem 1rem; background: var(--border); border-radius: 8px; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function toggleWrong(only) {
  document.querySelectorAll('article.question.pass').forEach(q => {
    q.style.display = only ? 'none' : '';
  });
}
"#;
