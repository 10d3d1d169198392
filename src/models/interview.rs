use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One question/answer pair of an interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InterviewTurn {
    #[sqlx(rename = "seq")]
    pub id: i32,
    pub question: String,
    pub response: String,
}

impl InterviewTurn {
    pub fn question(id: i32, question: String) -> Self {
        Self {
            id,
            question,
            response: String::new(),
        }
    }
}

/// Renders turns as the `Pregunta:/Respuesta:` blocks fed to the generative model.
pub fn transcript_text(turns: &[InterviewTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("Pregunta: {}\nRespuesta: {}\n", t.question, t.response))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_joins_turns_with_blank_line() {
        let turns = vec![
            InterviewTurn {
                id: 0,
                question: "¿Experiencia?".into(),
                response: "Cinco años".into(),
            },
            InterviewTurn::question(1, "¿Disponibilidad?".into()),
        ];
        assert_eq!(
            transcript_text(&turns),
            "Pregunta: ¿Experiencia?\nRespuesta: Cinco años\n\nPregunta: ¿Disponibilidad?\nRespuesta: \n"
        );
        assert_eq!(transcript_text(&[]), "");
    }
}
