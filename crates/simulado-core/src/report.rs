//! Exam report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AggregationError;
use crate::model::{Question, SessionBundle, SimulationResult, Subject};
use crate::statistics::{summarize, Summary};

/// A finished exam with its aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Subject of the session.
    pub subject: Subject,
    pub summary: Summary,
    pub questions: Vec<Question>,
    pub results: Vec<SimulationResult>,
}

/// One question paired with the learner's answer.
#[derive(Debug, Clone, Copy)]
pub struct QuestionReview<'a> {
    /// Zero-based position in the exam.
    pub index: usize,
    pub question: &'a Question,
    /// `None` if the question was never answered.
    pub result: Option<&'a SimulationResult>,
}

impl QuestionReview<'_> {
    pub fn is_correct(&self) -> bool {
        self.result.is_some_and(|r| r.is_correct)
    }
}

impl ExamReport {
    /// Build a report from a handoff bundle.
    pub fn from_bundle(bundle: SessionBundle) -> Result<Self, AggregationError> {
        let summary = summarize(&bundle)?;
        let subject = bundle.subject().ok_or(AggregationError::EmptySession)?;
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            subject,
            summary,
            questions: bundle.questions,
            results: bundle.results,
        })
    }

    /// Questions in exam order, each with its recorded result.
    pub fn reviews(&self) -> impl Iterator<Item = QuestionReview<'_>> + '_ {
        self.questions
            .iter()
            .enumerate()
            .map(move |(index, question)| QuestionReview {
                index,
                question,
                result: self.results.iter().find(|r| r.question_id == question.id),
            })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::Feedback;

    fn sample_bundle() -> SessionBundle {
        let questions: Vec<Question> = (0..4)
            .map(|i| Question {
                id: format!("q{i}"),
                subject: Subject::Humanities,
                topic: "Brasil Colônia".into(),
                statement: format!("Questão {i}"),
                options: ["A", "B", "C", "D", "E"].map(String::from),
                correct_index: 2,
                explanation: "Ciclo do açúcar.".into(),
            })
            .collect();
        let results = questions
            .iter()
            .take(3)
            .enumerate()
            .map(|(i, q)| SimulationResult {
                question_id: q.id.clone(),
                selected_option_index: if i == 0 { 1 } else { 2 },
                is_correct: i != 0,
                time_taken_seconds: 7.0,
            })
            .collect();
        SessionBundle { questions, results }
    }

    #[test]
    fn report_from_bundle() {
        let report = ExamReport::from_bundle(sample_bundle()).unwrap();
        assert_eq!(report.subject, Subject::Humanities);
        assert_eq!(report.summary.correct_count, 2);
        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.percentage, 50);
        assert_eq!(report.summary.feedback, Feedback::NeedsReinforcement);
    }

    #[test]
    fn reviews_pair_questions_with_results() {
        let report = ExamReport::from_bundle(sample_bundle()).unwrap();
        let reviews: Vec<_> = report.reviews().collect();
        assert_eq!(reviews.len(), 4);
        assert!(!reviews[0].is_correct());
        assert!(reviews[1].is_correct());
        assert!(reviews[3].result.is_none());
        assert_eq!(reviews[3].index, 3);
    }

    #[test]
    fn empty_bundle_has_no_report() {
        assert!(ExamReport::from_bundle(SessionBundle::default()).is_err());
    }

    #[test]
    fn save_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let report = ExamReport::from_bundle(sample_bundle()).unwrap();
        report.save_json(&path).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["id"], report.id.to_string());
        assert_eq!(saved["summary"]["percentage"], report.summary.percentage);
        assert_eq!(saved["questions"].as_array().unwrap().len(), 4);
    }
}
