//! Prompt and output-schema construction for question generation.

use serde_json::{json, Value};

use crate::model::{Proficiency, SimulationMode, Subject, OPTION_COUNT};

/// System instruction sent alongside every generation prompt.
pub const SYSTEM_PROMPT: &str = "Atue como um especialista no ENEM (Exame Nacional do Ensino Médio) do Brasil. Responda apenas com JSON válido.";

/// Difficulty instruction derived from the learner's proficiency.
pub fn focus_instruction(proficiency: Proficiency) -> &'static str {
    match proficiency {
        Proficiency::Low => {
            "Foque em conceitos fundamentais e questões de nível fácil a médio para construir base."
        }
        Proficiency::Medium => "Misture questões de nível médio e difícil.",
        Proficiency::High => {
            "Foque em questões de nível difícil e desafiador, exigindo raciocínio complexo."
        }
    }
}

/// Explanation instruction derived from the simulation mode.
pub fn explanation_instruction(mode: SimulationMode) -> &'static str {
    match mode {
        SimulationMode::Standard => "Uma explicação didática e sucinta da solução.",
        SimulationMode::Practice => {
            "Uma explicação EXTREMAMENTE DETALHADA e EDUCATIVA.
   A explicação DEVE conter:
   1. O conceito chave da Matriz de Referência do ENEM abordado.
   2. A resolução passo a passo da alternativa correta.
   3. Uma análise de POR QUE cada alternativa incorreta está errada (ex: 'A alternativa A está incorreta porque...').
   4. Dicas de estudo relacionadas ao tema."
        }
    }
}

/// Build the user prompt for a batch of questions.
pub fn build_prompt(
    subject: Subject,
    count: u32,
    proficiency: Proficiency,
    mode: SimulationMode,
) -> String {
    format!(
        "Atue como um especialista no ENEM (Exame Nacional do Ensino Médio) do Brasil.

Gere {count} questões inéditas mas baseadas no estilo oficial do ENEM sobre a área: {subject}.
{focus}

As questões devem ter:
1. Um enunciado contextualizado (estilo ENEM).
2. {OPTION_COUNT} alternativas.
3. {explanation}

Retorne APENAS um JSON válido.",
        focus = focus_instruction(proficiency),
        explanation = explanation_instruction(mode),
    )
}

/// JSON Schema of the expected response: an array of question objects.
///
/// Providers translate it into their own structured-output dialect.
pub fn question_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "O tópico específico da matéria (ex: Geometria Plana)"
                },
                "statement": {
                    "type": "string",
                    "description": "O texto da questão"
                },
                "options": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": OPTION_COUNT,
                    "maxItems": OPTION_COUNT,
                    "description": "Array com exatamente 5 alternativas de texto"
                },
                "correctIndex": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": OPTION_COUNT - 1,
                    "description": "O índice (0-4) da resposta correta"
                },
                "explanation": {
                    "type": "string",
                    "description": "Explicação detalhada da solução (Markdown permitido)"
                }
            },
            "required": ["topic", "statement", "options", "correctIndex", "explanation"]
        }
    })
}
