// CV extraction prompt templates, one per locale.
// `{raw_text}` and `{no_invention}` are filled in by `build_prompt`.

use crate::llm_client::prompts::{
    JSON_ONLY_SYSTEM, JSON_ONLY_SYSTEM_ES, NO_INVENTION_INSTRUCTION, NO_INVENTION_INSTRUCTION_ES,
};
use crate::models::cv::Locale;

pub const CV_EXTRACT_PROMPT_EN: &str = r#"Extract the curriculum vitae in the following text into a structured JSON object.

INPUT TEXT:
{raw_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "personalInfo": {
    "fullName": "string",
    "email": "string",
    "phone": "string",
    "address": "string",
    "summary": "string"
  },
  "education": [
    {
      "institution": "string",
      "degree": "string",
      "fieldOfStudy": "string",
      "startDate": "string",
      "endDate": "string",
      "description": "string"
    }
  ],
  "experience": [
    {
      "company": "string",
      "position": "string",
      "startDate": "string",
      "endDate": "string",
      "description": "string"
    }
  ],
  "abilities": ["string"]
}

RULES:
1. {no_invention}
2. Keep dates exactly as written in the text (e.g. "2015", "Jan 2019", "present").
3. List education and experience in the order they appear in the text.
4. Return ONLY the JSON object and nothing else: no code fences, no commentary."#;

pub const CV_EXTRACT_PROMPT_ES: &str = r#"Extrae el currículum del siguiente texto a un objeto JSON estructurado.

TEXTO DE ENTRADA:
{raw_text}

ESQUEMA DE SALIDA (devuelve exactamente esta estructura, con estas claves en inglés):
{
  "personalInfo": {
    "fullName": "string",
    "email": "string",
    "phone": "string",
    "address": "string",
    "summary": "string"
  },
  "education": [
    {
      "institution": "string",
      "degree": "string",
      "fieldOfStudy": "string",
      "startDate": "string",
      "endDate": "string",
      "description": "string"
    }
  ],
  "experience": [
    {
      "company": "string",
      "position": "string",
      "startDate": "string",
      "endDate": "string",
      "description": "string"
    }
  ],
  "abilities": ["string"]
}

REGLAS:
1. {no_invention}
2. Conserva las fechas tal como aparecen en el texto (p. ej. "2015", "ene 2019", "actualidad").
3. Enumera la formación y la experiencia en el orden en que aparecen en el texto.
4. Devuelve SOLO el objeto JSON: nada más, sin bloques de código ni comentarios."#;

/// Returns `(prompt, system)` for the given locale.
pub fn build_prompt(raw_text: &str, locale: Locale) -> (String, &'static str) {
    let (template, no_invention, system) = match locale {
        Locale::En => (CV_EXTRACT_PROMPT_EN, NO_INVENTION_INSTRUCTION, JSON_ONLY_SYSTEM),
        Locale::Es => (
            CV_EXTRACT_PROMPT_ES,
            NO_INVENTION_INSTRUCTION_ES,
            JSON_ONLY_SYSTEM_ES,
        ),
    };
    // Fill the instruction first so braces inside the CV text are never re-expanded.
    let prompt = template
        .replace("{no_invention}", no_invention)
        .replace("{raw_text}", raw_text);
    (prompt, system)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_and_schema() {
        let (prompt, system) = build_prompt("Jane Doe {no_invention}", Locale::En);
        assert!(prompt.contains("Jane Doe {no_invention}"));
        assert!(prompt.contains("\"fieldOfStudy\""));
        assert!(prompt.contains("Only use information present"));
        assert_eq!(system, JSON_ONLY_SYSTEM);
    }

    #[test]
    fn test_spanish_prompt_keeps_english_keys() {
        let (prompt, system) = build_prompt("Ana", Locale::Es);
        assert!(prompt.starts_with("Extrae el currículum"));
        assert!(prompt.contains("\"personalInfo\""));
        assert!(prompt.contains("Usa solo información presente"));
        assert_eq!(system, JSON_ONLY_SYSTEM_ES);
    }
}
