//! Core data model types for simulado.
//!
//! Subjects, proficiency levels, generated questions and the per-question
//! results an exam session accumulates.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of answer options every question carries (A–E).
pub const OPTION_COUNT: usize = 5;

/// The four ENEM knowledge areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    Math = 0,
    Humanities = 1,
    Nature = 2,
    Languages = 3,
}

impl Subject {
    /// Every subject, in exam order.
    pub const ALL: [Subject; 4] = [
        Subject::Math,
        Subject::Humanities,
        Subject::Nature,
        Subject::Languages,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase key used on the command line (e.g. "math").
    pub fn key(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Humanities => "humanities",
            Subject::Nature => "nature",
            Subject::Languages => "languages",
        }
    }

    /// Abbreviated area name used in compact displays.
    pub fn short_name(self) -> &'static str {
        match self {
            Subject::Math => "Mat",
            Subject::Humanities => "Hum",
            Subject::Nature => "Nat",
            Subject::Languages => "Ling",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "Matemática e suas Tecnologias"),
            Subject::Humanities => write!(f, "Ciências Humanas e suas Tecnologias"),
            Subject::Nature => write!(f, "Ciências da Natureza e suas Tecnologias"),
            Subject::Languages => write!(f, "Linguagens, Códigos e suas Tecnologias"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Subject::ALL
            .into_iter()
            .find(|subject| {
                needle == subject.key()
                    || needle == subject.short_name().to_lowercase()
                    || needle == subject.to_string().to_lowercase()
            })
            .ok_or_else(|| format!("unknown subject: {}", s.trim()))
    }
}

/// Self-reported skill level for a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Proficiency {
    Low,
    #[default]
    Medium,
    High,
}

impl Proficiency {
    pub const ALL: [Proficiency; 3] = [Proficiency::Low, Proficiency::Medium, Proficiency::High];

    /// Radar-chart value shown on the dashboard.
    pub fn score(self) -> u32 {
        match self {
            Proficiency::Low => 30,
            Proficiency::Medium => 60,
            Proficiency::High => 90,
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proficiency::Low => write!(f, "Baixo"),
            Proficiency::Medium => write!(f, "Médio"),
            Proficiency::High => write!(f, "Alto"),
        }
    }
}

impl FromStr for Proficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baixo" => Ok(Proficiency::Low),
            "medium" | "médio" | "medio" => Ok(Proficiency::Medium),
            "high" | "alto" => Ok(Proficiency::High),
            other => Err(format!("unknown proficiency: {other}")),
        }
    }
}

/// How a simulation is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Timed, brief explanations.
    #[default]
    Standard,
    /// Untimed, extended commented answers.
    Practice,
}

impl SimulationMode {
    pub fn label(self) -> &'static str {
        match self {
            SimulationMode::Standard => "Simulado Padrão",
            SimulationMode::Practice => "Modo Prática",
        }
    }

    pub fn is_timed(self) -> bool {
        self == SimulationMode::Standard
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMode::Standard => write!(f, "standard"),
            SimulationMode::Practice => write!(f, "practice"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "padrao" | "padrão" => Ok(SimulationMode::Standard),
            "practice" | "pratica" | "prática" => Ok(SimulationMode::Practice),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// A mapping with exactly one value per [`Subject`].
///
/// Backed by a fixed array, so a missing subject is impossible once the map
/// exists. Deserialization rejects input that omits any subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMap<T> {
    entries: [T; 4],
}

impl<T> SubjectMap<T> {
    pub fn from_fn(mut f: impl FnMut(Subject) -> T) -> Self {
        Self {
            entries: std::array::from_fn(|i| f(Subject::ALL[i])),
        }
    }

    pub fn get(&self, subject: Subject) -> &T {
        &self.entries[subject.index()]
    }

    pub fn set(&mut self, subject: Subject, value: T) {
        self.entries[subject.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subject, &T)> {
        Subject::ALL.into_iter().zip(self.entries.iter())
    }
}

impl<T: Clone> SubjectMap<T> {
    pub fn uniform(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T: Default> Default for SubjectMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Subject> for SubjectMap<T> {
    type Output = T;

    fn index(&self, subject: Subject) -> &T {
        self.get(subject)
    }
}

impl<T> IndexMut<Subject> for SubjectMap<T> {
    fn index_mut(&mut self, subject: Subject) -> &mut T {
        &mut self.entries[subject.index()]
    }
}

impl<T: Serialize> Serialize for SubjectMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SubjectMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = BTreeMap::<Subject, T>::deserialize(deserializer)?;
        let mut entries = Vec::with_capacity(Subject::ALL.len());
        for subject in Subject::ALL {
            let value = raw
                .remove(&subject)
                .ok_or_else(|| D::Error::custom(format!("missing entry for subject {subject:?}")))?;
            entries.push(value);
        }
        let entries: [T; 4] = entries
            .try_into()
            .map_err(|_| D::Error::custom("subject map must have exactly four entries"))?;
        Ok(Self { entries })
    }
}

/// A generated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier assigned at generation time.
    pub id: String,
    /// The subject that was requested, not the one the model claims.
    pub subject: Subject,
    /// Specific topic within the subject (e.g. "Geometria Plana").
    pub topic: String,
    /// The contextualized question text.
    pub statement: String,
    /// Answer options A–E.
    pub options: [String; OPTION_COUNT],
    /// Index of the correct option, always below [`OPTION_COUNT`].
    pub correct_index: usize,
    /// Worked solution, Markdown allowed.
    pub explanation: String,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }
}

/// Letter shown next to an option index (0 → 'A'), or '?' past the last option.
pub fn option_letter(index: usize) -> char {
    if index >= OPTION_COUNT {
        return '?';
    }
    char::from_u32('A' as u32 + index as u32).unwrap_or('?')
}

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub question_id: String,
    pub selected_option_index: usize,
    pub is_correct: bool,
    pub time_taken_seconds: f64,
}

/// Questions and results of a finished session, handed to the results view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionBundle {
    pub questions: Vec<Question>,
    pub results: Vec<SimulationResult>,
}

impl SessionBundle {
    /// Subject of the session, taken from its first question.
    pub fn subject(&self) -> Option<Subject> {
        self.questions.first().map(|q| q.subject)
    }

    /// Check that every stored option index points at a real option.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(q) = self.questions.iter().find(|q| q.correct_index >= OPTION_COUNT) {
            return Err(format!(
                "question '{}' has correct index {} out of range",
                q.id, q.correct_index
            ));
        }
        if let Some(r) = self
            .results
            .iter()
            .find(|r| r.selected_option_index >= OPTION_COUNT)
        {
            return Err(format!(
                "result for '{}' has selected index {} out of range",
                r.question_id, r.selected_option_index
            ));
        }
        Ok(())
    }
}
