//! Parsing of generated question batches.
//!
//! Turns the raw provider text into validated [`Question`]s. Every shape
//! problem is reported here as a typed [`GenerationError`], so nothing
//! downstream has to deal with half-formed questions.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::model::{Question, Subject, OPTION_COUNT};
use crate::traits::extract_json_payload;

/// Top-level response shape. OpenAI-style structured output needs an object
/// root, so the array may arrive wrapped under `questions`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBatch {
    List(Vec<Value>),
    Wrapped { questions: Vec<Value> },
}

/// One question as the model returns it, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    topic: String,
    statement: String,
    options: Vec<String>,
    #[serde(alias = "correct_index")]
    correct_index: i64,
    explanation: String,
}

/// Parse provider output into questions for `subject`.
///
/// Each question gets a fresh id and the requested subject; the model is not
/// trusted to echo either back.
pub fn parse_questions(content: &str, subject: Subject) -> Result<Vec<Question>, GenerationError> {
    if content.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let batch: RawBatch = serde_json::from_str(extract_json_payload(content))?;
    let items = match batch {
        RawBatch::List(items) => items,
        RawBatch::Wrapped { questions } => questions,
    };
    if items.is_empty() {
        return Err(GenerationError::NoQuestions);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let raw: RawQuestion = serde_json::from_value(item).map_err(|e| {
                GenerationError::MalformedQuestion {
                    index,
                    reason: e.to_string(),
                }
            })?;
            validate_question(raw, subject).map_err(|reason| GenerationError::MalformedQuestion {
                index,
                reason,
            })
        })
        .collect()
}

fn validate_question(raw: RawQuestion, subject: Subject) -> Result<Question, String> {
    if raw.statement.trim().is_empty() {
        return Err("statement is empty".to_string());
    }

    let option_count = raw.options.len();
    let options: [String; OPTION_COUNT] = raw
        .options
        .try_into()
        .map_err(|_| format!("expected {OPTION_COUNT} options, got {option_count}"))?;

    let correct_index = usize::try_from(raw.correct_index)
        .ok()
        .filter(|&i| i < OPTION_COUNT)
        .ok_or_else(|| {
            format!(
                "correctIndex {} is outside 0..={}",
                raw.correct_index,
                OPTION_COUNT - 1
            )
        })?;

    Ok(Question {
        id: Uuid::new_v4().to_string(),
        subject,
        topic: raw.topic.trim().to_string(),
        statement: raw.statement,
        options,
        correct_index,
        explanation: raw.explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_item(correct_index: i64) -> Value {
        json!({
            "topic": "Geometria Plana",
            "statement": "Um terreno retangular mede 12 m por 5 m. Qual é a sua diagonal?",
            "options": ["11 m", "12 m", "13 m", "14 m", "17 m"],
            "correctIndex": correct_index,
            "explanation": "Pelo teorema de Pitágoras, d² = 144 + 25 = 169."
        })
    }

    #[test]
    fn parses_plain_array_and_stamps_ids() {
        let content = json!([raw_item(2), raw_item(0)]).to_string();
        let questions = parse_questions(&content, Subject::Math).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_index, 2);
        assert_eq!(questions[0].topic, "Geometria Plana");
        assert!(questions.iter().all(|q| q.subject == Subject::Math));
        assert_ne!(questions[0].id, questions[1].id);
        assert!(Uuid::parse_str(&questions[0].id).is_ok());
    }

    #[test]
    fn ignores_subject_claimed_by_model() {
        let mut item = raw_item(1);
        item["subject"] = json!("LANGUAGES");
        let content = json!([item]).to_string();
        let questions = parse_questions(&content, Subject::Nature).unwrap();
        assert_eq!(questions[0].subject, Subject::Nature);
    }

    #[test]
    fn accepts_wrapped_and_fenced_payloads() {
        let content = format!(
            "```json\n{}\n```",
            json!({ "questions": [raw_item(4)] })
        );
        let questions = parse_questions(&content, Subject::Humanities).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_index, 4);
    }

    #[test]
    fn empty_content_is_an_error() {
        assert!(matches!(
            parse_questions("   ", Subject::Math),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_questions("[{\"topic\": ", Subject::Math),
            Err(GenerationError::InvalidJson(_))
        ));
    }

    #[test]
    fn empty_array_is_an_error() {
        assert!(matches!(
            parse_questions("[]", Subject::Math),
            Err(GenerationError::NoQuestions)
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut item = raw_item(1);
        item.as_object_mut().unwrap().remove("explanation");
        let content = json!([raw_item(0), item]).to_string();
        match parse_questions(&content, Subject::Math) {
            Err(GenerationError::MalformedQuestion { index, reason }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("explanation"), "got: {reason}");
            }
            other => panic!("expected MalformedQuestion, got {other:?}"),
        }

        let mut item = raw_item(1);
        item.as_object_mut().unwrap().remove("topic");
        let content = json!([item]).to_string();
        match parse_questions(&content, Subject::Math) {
            Err(GenerationError::MalformedQuestion { index, reason }) => {
                assert_eq!(index, 0);
                assert!(reason.contains("topic"), "got: {reason}");
            }
            other => panic!("expected MalformedQuestion, got {other:?}"),
        }
    }

    #[test]
    fn wrong_option_count_is_malformed() {
        let mut item = raw_item(1);
        item["options"] = json!(["a", "b", "c", "d"]);
        let content = json!([item]).to_string();
        match parse_questions(&content, Subject::Math) {
            Err(GenerationError::MalformedQuestion { reason, .. }) => {
                assert_eq!(reason, "expected 5 options, got 4");
            }
            other => panic!("expected MalformedQuestion, got {other:?}"),
        }
    }

    #[test]
    fn correct_index_out_of_range_is_malformed() {
        for bad in [-1, 5] {
            let content = json!([raw_item(bad)]).to_string();
            assert!(matches!(
                parse_questions(&content, Subject::Math),
                Err(GenerationError::MalformedQuestion { index: 0, .. })
            ));
        }
    }

    #[test]
    fn blank_statement_is_malformed() {
        let mut item = raw_item(1);
        item["statement"] = json!("  ");
        let content = json!([item]).to_string();
        assert!(matches!(
            parse_questions(&content, Subject::Math),
            Err(GenerationError::MalformedQuestion { .. })
        ));
    }
}
