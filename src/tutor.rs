#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};

use crate::{
    config::OpenAiEnv,
    constants::{REFLECTION_MESSAGE, STARTER_CODE, SYSTEM_MESSAGE},
    grade::{grade, grade_to_text},
    snippets::suggest,
};

/// Explicit, caller-owned chat state for one tutoring session.
///
/// Created when a session starts, carried through each exchange, and cleared
/// when the session ends; nothing about the conversation lives in process
/// globals.
#[derive(Clone, Default)]
pub struct Conversation {
    /// The accumulated chat messages, oldest first.
    messages: Vec<ChatCompletionRequestMessage>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated messages, oldest first.
    pub fn messages(&self) -> &[ChatCompletionRequestMessage] {
        &self.messages
    }

    /// Number of accumulated messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no exchange has happened yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops the accumulated history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Where hints come from.
enum HintBackend {
    /// Chat completions against an OpenAI-compatible endpoint.
    OpenAi {
        /// Environment-sourced credentials and tuning.
        env:    OpenAiEnv,
        /// The API client built from `env`.
        client: OpenAIClient<OpenAIConfig>,
    },
    /// The built-in snippet dictionary, used when no credentials are set.
    Snippets,
}

/// The Socratic hint service.
///
/// Every request first grades the student's code, then folds the grade
/// report into the prompt so guidance is grounded in what the code currently
/// does. The grader never depends on the tutor; the tutor is a downstream
/// consumer of its output.
pub struct Tutor {
    /// The selected hint backend.
    backend: HintBackend,
}

impl Tutor {
    /// Builds a tutor from the environment, falling back to the snippet
    /// backend when no API key is configured.
    pub fn from_env() -> Self {
        match OpenAiEnv::from_env() {
            Some(env) => {
                let mut config = OpenAIConfig::new().with_api_key(env.api_key());
                if let Some(base) = env.api_base() {
                    config = config.with_api_base(base);
                }
                tracing::info!(model = env.model(), "using OpenAI hint backend");
                Self {
                    backend: HintBackend::OpenAi {
                        client: OpenAIClient::with_config(config),
                        env,
                    },
                }
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not set, falling back to built-in hint snippets");
                Self::offline()
            }
        }
    }

    /// Builds a tutor that only serves the built-in snippets.
    pub fn offline() -> Self {
        Self {
            backend: HintBackend::Snippets,
        }
    }

    /// Produces one hint for the student's current code, appending the
    /// exchange to `conversation`.
    pub async fn advise(&self, conversation: &mut Conversation, code: &str) -> Result<String> {
        let report = grade_to_text(code);

        if conversation.is_empty() {
            conversation.messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_MESSAGE.to_string())
                    .name("Instructor".to_string())
                    .build()
                    .context("Failed to build system message")?
                    .into(),
            );
        }

        conversation.messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "I'm stuck. Here's my code:\n```rhai\n{code}\n```\n\nRunning it against \
                     the test cases produced:\n```\n{report}\n```"
                ))
                .name("Student".to_string())
                .build()
                .context("Failed to build user message")?
                .into(),
        );

        let reply = match &self.backend {
            HintBackend::OpenAi { env, client } => {
                self.complete(env, client, conversation.messages.clone()).await?
            }
            HintBackend::Snippets => pick_snippet(code),
        };

        conversation.messages.push(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(reply.clone())
                .build()
                .context("Failed to build assistant message")?
                .into(),
        );

        Ok(reply)
    }

    /// Evaluates the student's prose explanation of their solution: praise
    /// plus a challenge when base case, recursive case, and combination are
    /// all understood, a targeted follow-up question otherwise.
    ///
    /// Reflection is a one-shot exchange; it does not touch any conversation.
    pub async fn reflect(&self, code: &str, explanation: &str) -> Result<String> {
        match &self.backend {
            HintBackend::OpenAi { env, client } => {
                let messages = vec![
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(REFLECTION_MESSAGE.to_string())
                        .name("Instructor".to_string())
                        .build()
                        .context("Failed to build system message")?
                        .into(),
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(format!(
                            "The student solved factorial with this \
                             code:\n```rhai\n{code}\n```\n\nTheir explanation: \
                             \"{explanation}\"\n\nEvaluate their understanding and respond \
                             appropriately."
                        ))
                        .name("Student".to_string())
                        .build()
                        .context("Failed to build user message")?
                        .into(),
                ];
                self.complete(env, client, messages).await
            }
            HintBackend::Snippets => Ok(reflect_offline(code, explanation)),
        }
    }

    /// Sends the conversation to the chat-completion endpoint and returns the
    /// assistant's reply.
    async fn complete(
        &self,
        env: &OpenAiEnv,
        client: &OpenAIClient<OpenAIConfig>,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<String> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(env.model()).messages(messages);
        if let Some(temperature) = env.temperature() {
            request.temperature(temperature);
        }
        if let Some(top_p) = env.top_p() {
            request.top_p(top_p);
        }
        let request = request
            .build()
            .context("Failed to build chat completion request")?;

        let response = client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion response had no content")
    }
}

/// Offline hint selection: grade the code and map the report's shape onto the
/// snippet dictionary.
fn pick_snippet(code: &str) -> String {
    match grade(code) {
        Ok(report) => suggest(&report).to_string(),
        Err(e) => format!("{e}\n\nStart from:\n```rhai\n{STARTER_CODE}```"),
    }
}

/// Offline reflection: a keyword check for each concept the explanation
/// should cover, combined with whether the code actually passes.
fn reflect_offline(code: &str, explanation: &str) -> String {
    let explanation = explanation.to_lowercase();
    let mentions_base = ["base case", "stops", "stop", "terminates", "n == 0", "n == 1"]
        .iter()
        .any(|k| explanation.contains(k));
    let mentions_recursive = ["recursive", "calls itself", "n - 1", "n-1", "smaller"]
        .iter()
        .any(|k| explanation.contains(k));
    let solved = grade(code).map(|r| r.all_passed()).unwrap_or(false);

    if mentions_base && mentions_recursive && solved {
        "Nicely done: you named the base case and explained how each call shrinks the problem. \
         As a challenge, write `fn sum(n)` that returns 0 + 1 + ... + n the same way."
            .to_string()
    } else if !mentions_base {
        "What stops your function from calling itself forever? Try explaining which input makes \
         it return without another recursive call."
            .to_string()
    } else if !mentions_recursive {
        "How does factorial(n) use factorial(n - 1)? Try explaining what happens to n on each \
         call and how the results combine."
            .to_string()
    } else {
        "Your explanation sounds right, but your code doesn't pass every test yet. Which test \
         case fails first, and what does your function return for it?"
            .to_string()
    }
}
