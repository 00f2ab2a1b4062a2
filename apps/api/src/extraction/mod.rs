// CV extraction core.
// Heuristic path: patterns + sections → heuristic. AI path: prompts + ai.
// The pipeline chooses between them; handlers expose it over HTTP.

pub mod ai;
pub mod handlers;
pub mod heuristic;
pub mod patterns;
pub mod pipeline;
pub mod prompts;
pub mod sections;
