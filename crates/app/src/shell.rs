use std::sync::Arc;

use tedai_campus::{AssignmentStatus, Tracker, View, mock_events, mock_schedule};
use tedai_chat::{
    ChatController, Disclosure, IgnoreReason, MessageContent, QuizReveals, SubmitOutcome,
    render_message,
};
use tedai_llm::{AnswerClient, create_backend, is_known_gemini_model};

use crate::format::{
    format_events, format_message, format_schedule, format_tracker, view_header,
};
use crate::settings::{AppSettings, SettingsStore};

pub const THINKING_INDICATOR: &str = "Thinking...";

pub const MISSING_API_KEY: &str =
    "No API key configured. Set TEDAI_API_KEY or API_KEY, or run /key <api-key>.";

pub const HELP_LINES: [&str; 9] = [
    "/chat                  ask ted.ai",
    "/schedule              today's classes",
    "/events                upcoming events",
    "/tracker               assignment progress",
    "/status <id> <status>  set an assignment to To Do, In Progress or Completed",
    "/reveal <n>            show the quiz answer of message n",
    "/key <api-key>         save the Gemini API key",
    "/help                  show this list",
    "/quit                  exit",
];

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Switch(View),
    Status { id: String, status: String },
    Reveal(usize),
    Key(String),
    Help,
    Quit,
    Prompt(String),
    Empty,
    Invalid(String),
}

/// Prompts keep the line exactly as typed; only commands are trimmed.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Prompt(line.to_string());
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "chat" => Command::Switch(View::AiChat),
        "schedule" => Command::Switch(View::Schedule),
        "events" => Command::Switch(View::Events),
        "tracker" => Command::Switch(View::Tracker),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "status" => match args.split_once(char::is_whitespace) {
            Some((id, status)) => Command::Status {
                id: id.to_string(),
                status: status.trim().to_string(),
            },
            None => Command::Invalid("usage: /status <id> <status>".to_string()),
        },
        "reveal" => match args.parse::<usize>() {
            Ok(position) if position > 0 => Command::Reveal(position),
            _ => Command::Invalid("usage: /reveal <message number>".to_string()),
        },
        "key" if !args.is_empty() => Command::Key(args.to_string()),
        "key" => Command::Invalid("usage: /key <api-key>".to_string()),
        other => Command::Invalid(format!("unknown command '/{other}', try /help")),
    }
}

/// Chat controller, or the reason the chat view cannot be used.
pub enum ChatSlot {
    Ready(Arc<ChatController>),
    Unavailable(String),
}

impl ChatSlot {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let Some(config) = settings.to_backend_config() else {
            return Self::Unavailable(MISSING_API_KEY.to_string());
        };

        if !is_known_gemini_model(&settings.model) {
            tracing::warn!(
                model_id = %settings.model,
                "model is not in the known Gemini list, structured output may be rejected"
            );
        }

        match create_backend(config) {
            Ok(backend) => {
                let client = AnswerClient::new(backend)
                    .with_model(settings.model.clone())
                    .with_temperature(settings.temperature);
                tracing::info!(
                    backend_id = client.backend_id(),
                    model_id = client.model_id(),
                    "chat backend ready"
                );
                Self::Ready(Arc::new(ChatController::new(client)))
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to create chat backend");
                Self::Unavailable(error.to_string())
            }
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

/// Terminal stand-in for the view shell: one mounted view plus its state.
pub struct Shell {
    view: View,
    chat: ChatSlot,
    tracker: Tracker,
    reveals: QuizReveals,
    store: SettingsStore,
}

impl Shell {
    pub fn new(store: SettingsStore) -> Self {
        let chat = ChatSlot::from_settings(&store.settings());
        Self::with_chat(store, chat)
    }

    pub fn with_chat(store: SettingsStore, chat: ChatSlot) -> Self {
        Self {
            view: View::default(),
            chat,
            tracker: Tracker::default(),
            reveals: QuizReveals::default(),
            store,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Whether `command` starts a round trip to the model.
    pub fn submits(&self, command: &Command) -> bool {
        matches!(command, Command::Prompt(_))
            && self.view == View::AiChat
            && matches!(self.chat, ChatSlot::Ready(_))
    }

    pub async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Empty => Reply::default(),
            Command::Quit => Reply {
                lines: Vec::new(),
                quit: true,
            },
            Command::Help => Reply::lines(HELP_LINES.iter().map(|line| line.to_string()).collect()),
            Command::Invalid(message) => Reply::line(message),
            Command::Switch(view) => {
                self.view = view;
                Reply::lines(self.render_view().await)
            }
            Command::Status { id, status } => self.set_status(&id, &status),
            Command::Reveal(position) => self.reveal(position).await,
            Command::Key(api_key) => self.save_api_key(api_key),
            Command::Prompt(prompt) => self.submit(prompt).await,
        }
    }

    pub async fn render_view(&self) -> Vec<String> {
        let mut lines = vec![view_header(self.view.label())];
        match self.view {
            View::AiChat => match &self.chat {
                ChatSlot::Ready(chat) => {
                    let snapshot = chat.snapshot().await;
                    for (index, message) in snapshot.messages.iter().enumerate() {
                        let disclosure = self.reveals.disclosure_for(message.id());
                        lines.extend(format_message(&render_message(message, disclosure), index + 1));
                    }
                    if let Some(error) = snapshot.last_error {
                        lines.push(error.message);
                    }
                }
                ChatSlot::Unavailable(reason) => lines.push(reason.clone()),
            },
            View::Schedule => lines.extend(format_schedule(&mock_schedule())),
            View::Events => lines.extend(format_events(&mock_events())),
            View::Tracker => lines.extend(format_tracker(&self.tracker)),
        }
        lines
    }

    async fn submit(&mut self, prompt: String) -> Reply {
        if self.view != View::AiChat {
            return Reply::line("Switch to /chat to ask ted.ai.");
        }

        let chat = match &self.chat {
            ChatSlot::Ready(chat) => chat.clone(),
            ChatSlot::Unavailable(reason) => return Reply::line(reason.clone()),
        };

        match chat.submit(prompt).await {
            SubmitOutcome::Answered(message_id) => {
                let snapshot = chat.snapshot().await;
                let Some((index, message)) = snapshot
                    .messages
                    .iter()
                    .enumerate()
                    .find(|(_, message)| message.id() == message_id)
                else {
                    return Reply::default();
                };
                Reply::lines(format_message(
                    &render_message(message, Disclosure::Hidden),
                    index + 1,
                ))
            }
            SubmitOutcome::Failed(error) => Reply::line(error.message),
            SubmitOutcome::Ignored(IgnoreReason::RequestPending) => {
                Reply::line("Still working on the previous question.")
            }
            SubmitOutcome::Ignored(IgnoreReason::EmptyPrompt) => Reply::default(),
        }
    }

    async fn reveal(&mut self, position: usize) -> Reply {
        let ChatSlot::Ready(chat) = &self.chat else {
            return Reply::line(MISSING_API_KEY);
        };

        let snapshot = chat.snapshot().await;
        let Some(message) = position
            .checked_sub(1)
            .and_then(|index| snapshot.messages.get(index))
        else {
            return Reply::line(format!("There is no message {position}."));
        };
        if !matches!(message.content(), MessageContent::Structured(_)) {
            return Reply::line(format!("Message {position} has no quiz."));
        }

        self.reveals.reveal(message.id());
        Reply::lines(format_message(
            &render_message(message, Disclosure::Revealed),
            position,
        ))
    }

    fn set_status(&mut self, id: &str, raw_status: &str) -> Reply {
        let status = match raw_status.parse::<AssignmentStatus>() {
            Ok(status) => status,
            Err(error) => return Reply::line(error.to_string()),
        };

        if let Err(error) = self.tracker.set_status(id, status) {
            return Reply::line(error.to_string());
        }

        let mut lines = vec![format!("Marked {id} as {status}.")];
        if self.view == View::Tracker {
            lines.extend(format_tracker(&self.tracker));
        }
        Reply::lines(lines)
    }

    fn save_api_key(&mut self, api_key: String) -> Reply {
        let settings = AppSettings {
            api_key,
            ..(*self.store.settings()).clone()
        };

        if let Err(error) = self.store.update(settings) {
            tracing::error!(error = %error, "failed to save settings");
            return Reply::line(format!("Could not save the API key: {error}"));
        }

        if matches!(self.chat, ChatSlot::Ready(_)) {
            return Reply::line("API key saved. Restart tedai to use it.");
        }

        self.chat = ChatSlot::from_settings(&self.store.settings());
        match &self.chat {
            ChatSlot::Ready(_) => Reply::line("API key saved. ted.ai is ready."),
            ChatSlot::Unavailable(reason) => Reply::line(reason.clone()),
        }
    }
}
