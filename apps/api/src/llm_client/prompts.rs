// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Spanish counterpart of [`JSON_ONLY_SYSTEM`].
pub const JSON_ONLY_SYSTEM_ES: &str = "Eres un asistente preciso y estructurado. \
    DEBES responder únicamente con JSON válido. \
    NO incluyas texto fuera del objeto JSON. \
    NO uses bloques de código markdown. \
    NO incluyas explicaciones ni disculpas.";

/// Instruction that keeps extracted values faithful to the source text.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Only use information present in the text. \
    Do NOT infer, interpolate, or invent details. \
    Use an empty string for any value that does not appear in the text.";

/// Spanish counterpart of [`NO_INVENTION_INSTRUCTION`].
pub const NO_INVENTION_INSTRUCTION_ES: &str = "\
    CRÍTICO: Usa solo información presente en el texto. \
    NO deduzcas, interpoles ni inventes detalles. \
    Usa una cadena vacía para cualquier valor que no aparezca en el texto.";
