//! Result aggregation for a finished session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AggregationError;
use crate::model::{SessionBundle, SimulationResult};

/// Qualitative verdict derived from the accuracy percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// 80% and above.
    Excellent,
    /// 60% to 79%.
    Good,
    NeedsReinforcement,
}

impl Feedback {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Feedback::Excellent,
            60..=79 => Feedback::Good,
            _ => Feedback::NeedsReinforcement,
        }
    }

    /// Message shown on the results screen.
    pub fn message(self) -> &'static str {
        match self {
            Feedback::Excellent => "Excelente! Você domina esse assunto.",
            Feedback::Good => "Muito bom! Continue praticando.",
            Feedback::NeedsReinforcement => "Foco total! Vamos reforçar a base.",
        }
    }
}

/// Correct/total tally for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    pub correct: usize,
    pub total: usize,
}

/// Aggregate statistics of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub correct_count: usize,
    /// Answered questions that were wrong.
    pub incorrect_count: usize,
    /// Number of questions in the session.
    pub total: usize,
    /// `round(100 * correct / total)`, halves rounded up.
    pub percentage: u32,
    pub feedback: Feedback,
    pub total_time_seconds: f64,
    /// Mean time per answered question; zero when nothing was answered.
    pub average_time_seconds: f64,
    /// Per-topic breakdown, in order of first appearance.
    pub topics: Vec<TopicStats>,
}

/// Rounded percentage of `part` over `whole` using integer arithmetic.
fn rounded_percentage(part: usize, whole: usize) -> u32 {
    let part = part as u64;
    let whole = whole as u64;
    ((200 * part + whole) / (2 * whole)) as u32
}

/// Summarize a finished session.
pub fn summarize(bundle: &SessionBundle) -> Result<Summary, AggregationError> {
    let total = bundle.questions.len();
    if total == 0 {
        return Err(AggregationError::EmptySession);
    }

    let correct_count = bundle.results.iter().filter(|r| r.is_correct).count();
    let incorrect_count = bundle.results.len() - correct_count;
    let percentage = rounded_percentage(correct_count, total);

    let total_time_seconds: f64 = bundle.results.iter().map(|r| r.time_taken_seconds).sum();
    let average_time_seconds = if bundle.results.is_empty() {
        0.0
    } else {
        total_time_seconds / bundle.results.len() as f64
    };

    Ok(Summary {
        correct_count,
        incorrect_count,
        total,
        percentage,
        feedback: Feedback::from_percentage(percentage),
        total_time_seconds,
        average_time_seconds,
        topics: topic_breakdown(bundle),
    })
}

fn topic_breakdown(bundle: &SessionBundle) -> Vec<TopicStats> {
    let by_id: HashMap<&str, &SimulationResult> = bundle
        .results
        .iter()
        .map(|r| (r.question_id.as_str(), r))
        .collect();

    let mut topics: Vec<TopicStats> = Vec::new();
    for question in &bundle.questions {
        let correct = by_id
            .get(question.id.as_str())
            .is_some_and(|r| r.is_correct);
        let topic = if question.topic.trim().is_empty() {
            "Geral"
        } else {
            question.topic.as_str()
        };

        match topics.iter_mut().find(|t| t.topic == topic) {
            Some(stats) => {
                stats.total += 1;
                stats.correct += usize::from(correct);
            }
            None => topics.push(TopicStats {
                topic: topic.to_string(),
                correct: usize::from(correct),
                total: 1,
            }),
        }
    }
    topics
}
