//! The `simulado run` command: an interactive exam on stdin/stdout.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use simulado_core::error::SessionError;
use simulado_core::generator::QuestionGenerator;
use simulado_core::model::{option_letter, SimulationMode, Subject, OPTION_COUNT};
use simulado_core::profile::{Profile, ProfileStore};
use simulado_core::session::{Advance, ExamRequest, ExamSession};
use simulado_core::statistics::{summarize, Summary};
use simulado_core::store::HandoffStore;
use simulado_core::traits::LlmProvider;
use simulado_providers::create_provider;

use super::{open_store, Paths};

pub struct RunArgs {
    pub subject: Option<String>,
    pub count: Option<String>,
    pub mode: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// How an interactive exam ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Abandoned,
}

pub async fn execute(paths: &Paths, args: RunArgs) -> Result<()> {
    let config = paths.load_config()?;
    let store = open_store(&config);
    let profile = ProfileStore::open(Arc::clone(&store)).profile();

    anyhow::ensure!(
        profile.is_onboarded,
        "no learner profile yet; run `simulado onboard --name <NAME> --course <COURSE>` first"
    );

    let request = match ExamRequest::from_params(
        args.subject.as_deref(),
        args.count.as_deref(),
        args.mode.as_deref(),
    ) {
        Ok(request) => request,
        Err(SessionError::MissingSubject) => {
            print_setup_hint(&profile);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    anyhow::ensure!(
        ExamRequest::ALLOWED_COUNTS.contains(&request.count),
        "--count must be one of 3, 5 or 10"
    );

    let (provider_name, provider_config) = config.provider(args.provider.as_deref())?;
    let provider: Arc<dyn LlmProvider> =
        Arc::from(create_provider(provider_name, provider_config)?);
    let model = args.model.unwrap_or_else(|| config.default_model.clone());
    let generator = QuestionGenerator::new(provider, model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.max_tokens);

    println!(
        "Gerando {} questões de {} ({})...",
        request.count,
        request.subject,
        request.mode.label()
    );

    let mut session = ExamSession::new(request, HandoffStore::new(store));
    if let Err(e) = session.start(&generator, &profile).await {
        let message = session
            .failure_message()
            .map(str::to_string)
            .unwrap_or_else(|| e.to_string());
        return Err(anyhow::Error::new(e).context(message));
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let outcome = drive(&mut session, &mut stdin.lock(), &mut stdout.lock())?;

    if outcome == Outcome::Completed {
        let bundle = session
            .bundle()
            .context("session finished without a result bundle")?;
        print_summary(&summarize(bundle)?);
        println!("\nDetalhes: simulado results --html resultado.html");
    }
    Ok(())
}

fn print_setup_hint(profile: &Profile) {
    println!("Escolha uma área para o simulado:");
    for subject in Subject::ALL {
        println!("  --subject {:<11} {}", subject.key(), subject);
    }
    println!(
        "\nSugestão: simulado run --subject {} --count 5",
        profile.weakest_subject().key()
    );
}

fn progress_bar(fraction: f64) -> String {
    let filled = (fraction * 10.0).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(10 - filled.min(10)),
        fraction * 100.0
    )
}

/// Parse an answer letter (A–E, any case) into an option index.
fn parse_answer(input: &str) -> Option<usize> {
    let mut chars = input.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    (0..OPTION_COUNT).find(|&i| option_letter(i) == letter)
}

/// Run the question loop until the session completes or the learner quits.
pub fn drive<R: BufRead, W: Write>(
    session: &mut ExamSession,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    let mode = session.request().mode;
    let badge = if mode == SimulationMode::Practice {
        "  [PRÁTICA]"
    } else {
        ""
    };
    let mut line = String::new();

    loop {
        let Some((index, total)) = session.position() else {
            anyhow::bail!("session is not in progress");
        };
        let question = session
            .current_question()
            .context("session has no current question")?
            .clone();

        writeln!(out)?;
        writeln!(
            out,
            "Questão {} / {}  {}  {}{}",
            index + 1,
            total,
            progress_bar(session.progress()),
            question.topic,
            badge
        )?;
        writeln!(out, "{}", question.statement)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}) {}", option_letter(i), option)?;
        }

        loop {
            write!(out, "Resposta (A-E, q para sair): ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                anyhow::bail!("input ended before the exam was finished");
            }
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                writeln!(out, "Simulado abandonado.")?;
                return Ok(Outcome::Abandoned);
            }
            match parse_answer(answer) {
                Some(option) => {
                    session.select_option(option)?;
                    break;
                }
                None => writeln!(out, "Opção inválida: digite uma letra de A a E.")?,
            }
        }

        let result = session.check_answer()?;
        if result.is_correct {
            writeln!(out, "Correta!")?;
        } else {
            writeln!(
                out,
                "Incorreta. Resposta certa: {}",
                option_letter(question.correct_index)
            )?;
        }
        if mode.is_timed() {
            writeln!(out, "Tempo: {:.0}s", result.time_taken_seconds)?;
        }
        if mode == SimulationMode::Practice {
            writeln!(out, "\nGabarito Comentado")?;
        }
        writeln!(out, "\n{}", question.explanation)?;

        match session.advance()? {
            Advance::Next { .. } => continue,
            Advance::Completed => return Ok(Outcome::Completed),
        }
    }
}

fn print_summary(summary: &Summary) {
    let mut table = Table::new();
    table.set_header(vec!["Acertos", "Erros", "Aproveitamento", "Tempo médio"]);
    table.add_row(vec![
        Cell::new(format!("{}/{}", summary.correct_count, summary.total)),
        Cell::new(summary.incorrect_count),
        Cell::new(format!("{}%", summary.percentage)),
        Cell::new(format!("{:.0}s", summary.average_time_seconds)),
    ]);
    println!("\n{table}");
    println!("{}", summary.feedback.message());
}
