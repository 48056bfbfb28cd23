use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

use crate::config::Config;
use crate::providers::gemini::{self, Content, GenerateContentResponse};

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<GenerateContentResponse>> + 'a>>;

/// Seam between the session and the model API, so the session logic can be
/// exercised against a stub backend in tests.
pub trait ChatBackend {
    fn generate<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        contents: &'a [Content],
    ) -> GenerateFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiBackend;

impl ChatBackend for GeminiBackend {
    fn generate<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        contents: &'a [Content],
    ) -> GenerateFuture<'a> {
        Box::pin(async move { gemini::generate(client, cfg, contents).await })
    }
}

/// A single conversation with the model. The history is append-only: a
/// successful exchange appends the user turn and the model's reply, a failed
/// exchange leaves it untouched.
#[derive(Debug)]
pub struct ChatSession<'a, B = GeminiBackend> {
    client: &'a Client,
    cfg: &'a Config,
    backend: B,
    history: Vec<Content>,
}

impl<'a> ChatSession<'a> {
    /// Opens a session against the Gemini API. If a personality preamble is
    /// configured it is sent as the first message and its response is
    /// discarded; a failure there is fatal since the personality setup is a
    /// precondition for a valid session.
    pub async fn open(client: &'a Client, cfg: &'a Config) -> Result<ChatSession<'a>> {
        Self::open_with(client, cfg, GeminiBackend).await
    }
}

impl<'a, B: ChatBackend> ChatSession<'a, B> {
    pub async fn open_with(
        client: &'a Client,
        cfg: &'a Config,
        backend: B,
    ) -> Result<ChatSession<'a, B>> {
        let mut session = ChatSession {
            client,
            cfg,
            backend,
            history: Vec::new(),
        };

        if !cfg.preamble.is_empty() {
            info!("sending initial personality prompt");
            session
                .send_message(&cfg.preamble)
                .await
                .context("Failed to send initial personality prompt")?;
        }

        Ok(session)
    }

    /// Sends one user message on top of the accumulated history and returns
    /// the raw response for rendering.
    pub async fn send_message(&mut self, text: &str) -> Result<GenerateContentResponse> {
        let mut contents = self.history.clone();
        contents.push(Content::user(text));

        let response = self
            .backend
            .generate(self.client, self.cfg, &contents)
            .await?;

        self.history.push(Content::user(text));
        if let Some(reply) = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.clone())
        {
            self.history.push(reply);
        }
        debug!(history_len = self.history.len(), "exchange recorded");

        Ok(response)
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }
}
