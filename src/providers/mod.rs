pub mod gemini;
mod http_errors;
