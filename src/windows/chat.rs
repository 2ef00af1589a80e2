//! Pilot: the chat assistant window
//!
//! The window cycles `Idle -> Sending -> AwaitingResponse -> Idle`. Submitting
//! text moves it to `Sending`; the next poll resolves the provider and hands
//! the prompt to a background worker; polls then wait for the worker's single
//! result. Every request ends with exactly one `AI` or `System` entry.

use crate::config::{lock_config, SharedConfig};
use crate::error::{PluginError, ProviderError};
use crate::plugins::{PluginContext, PluginManifest, PluginWindow};
use crate::providers::{default_resolver, PendingRequest, ProviderResolver};
use crate::windows::transcript::{Sender, Transcript};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

pub const PLUGIN_NAME: &str = "Pilot";

pub const WINDOW_TITLE: &str = "Nova Chat - Pilot";

/// Greeting shown when a chat window opens
pub const GREETING: &str = "Hey there! How's it going?";

/// Time between typing indicator frames
pub const TYPING_INTERVAL: Duration = Duration::from_millis(400);

const TYPING_TEXT: &str = "AI is typing";

/// Where a chat window is in its request cycle
///
/// There is no separate error state: a failed request appends one `System`
/// entry and the window returns straight to `Idle` with input enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    /// Accepting input
    Idle,
    /// Message accepted, request not yet dispatched
    Sending,
    /// Request running on the worker
    AwaitingResponse,
}

/// "AI is typing" followed by 0 to 3 dots, one more every interval
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    started: Option<Instant>,
    interval: Duration,
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new(TYPING_INTERVAL)
    }
}

impl TypingIndicator {
    pub fn new(interval: Duration) -> Self {
        Self {
            started: None,
            interval,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn stop(&mut self) {
        self.started = None;
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// Number of trailing dots at `now`
    pub fn dots(&self, now: Instant) -> usize {
        match self.started {
            Some(started) => {
                let elapsed = now.saturating_duration_since(started);
                let frames = elapsed.as_millis() / self.interval.as_millis().max(1);
                (frames % 4) as usize
            }
            None => 0,
        }
    }

    /// Indicator text at `now`, or `None` when stopped
    pub fn text(&self, now: Instant) -> Option<String> {
        self.started
            .map(|_| format!("{}{}", TYPING_TEXT, ".".repeat(self.dots(now))))
    }
}

pub struct ChatWindow {
    config: SharedConfig,
    resolver: ProviderResolver,
    transcript: Transcript,
    input_buffer: String,
    input_enabled: bool,
    state: ChatState,
    outgoing: Option<String>,
    pending: Option<PendingRequest>,
    typing: TypingIndicator,
    last_poll: Instant,
    visible: bool,
    closed: bool,
}

impl ChatWindow {
    /// Create a chat window using the configured provider
    pub fn new(config: SharedConfig) -> Self {
        Self::with_resolver(config, default_resolver())
    }

    /// Create a chat window with a custom provider resolver
    pub fn with_resolver(config: SharedConfig, resolver: ProviderResolver) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Sender::Ai, GREETING);

        Self {
            config,
            resolver,
            transcript,
            input_buffer: String::new(),
            input_enabled: true,
            state: ChatState::Idle,
            outgoing: None,
            pending: None,
            typing: TypingIndicator::default(),
            last_poll: Instant::now(),
            visible: false,
            closed: false,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the text field and send button accept input
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    /// Replace the contents of the text field
    pub fn set_input(&mut self, text: &str) {
        if self.input_enabled {
            self.input_buffer = text.to_string();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Typing indicator text as of the last poll
    pub fn typing_text(&self) -> Option<String> {
        self.typing.text(self.last_poll)
    }

    /// Submit the contents of the text field
    ///
    /// Returns `false` when nothing was sent: the trimmed text is empty, input
    /// is disabled, or the window is closed.
    pub fn send(&mut self) -> bool {
        if !self.input_enabled || self.closed {
            debug!("Chat input ignored while {:?}", self.state);
            return false;
        }

        let text = self.input_buffer.trim().to_string();
        if text.is_empty() {
            return false;
        }

        self.transcript.push(Sender::You, text.clone());
        self.input_buffer.clear();
        self.input_enabled = false;
        self.outgoing = Some(text);
        self.typing.start(Instant::now());
        self.transition(ChatState::Sending);
        true
    }

    /// Put `text` into the text field and submit it
    pub fn submit(&mut self, text: &str) -> bool {
        self.set_input(text);
        self.send()
    }

    /// Resolve the provider and hand the prompt to a worker
    fn dispatch(&mut self) {
        let prompt = match self.outgoing.take() {
            Some(prompt) => prompt,
            None => {
                warn!("Chat window in Sending state without a prompt");
                self.finish(Err(ProviderError::WorkerError(
                    "No message to send".to_string(),
                )));
                return;
            }
        };

        let config = lock_config(&self.config).config().clone();
        let provider = match (self.resolver)(&config) {
            Ok(provider) => provider,
            Err(e) => {
                self.finish(Err(e));
                return;
            }
        };

        match PendingRequest::spawn(provider, prompt) {
            Ok(request) => {
                self.pending = Some(request);
                self.transition(ChatState::AwaitingResponse);
            }
            Err(e) => self.finish(Err(e)),
        }
    }

    /// Stop waiting and append the single outcome entry
    fn finish(&mut self, result: Result<String, ProviderError>) {
        self.pending = None;
        self.typing.stop();
        self.input_enabled = true;

        match result {
            Ok(reply) => self.transcript.push(Sender::Ai, reply),
            Err(e) => {
                debug!("Chat request ended in error: {}", e);
                self.transcript.push(Sender::System, format!("Error: {}", e));
            }
        }

        self.transition(ChatState::Idle);
    }

    fn transition(&mut self, next: ChatState) {
        debug!("Chat window {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl PluginWindow for ChatWindow {
    fn title(&self) -> String {
        WINDOW_TITLE.to_string()
    }

    fn show(&mut self) {
        self.visible = true;
        info!("Opened {}", WINDOW_TITLE);
    }

    fn render(&self) -> String {
        let mut lines = vec![format!("== {} ==", WINDOW_TITLE)];
        lines.extend(self.transcript.entries().iter().map(|e| e.to_string()));
        if let Some(typing) = self.typing_text() {
            lines.push(typing);
        }
        if !self.input_enabled {
            lines.push("(input disabled while waiting for a reply)".to_string());
        }
        lines.join("\n")
    }

    fn input(&mut self, line: &str) {
        self.submit(line);
    }

    fn poll(&mut self, now: Instant) {
        self.last_poll = now;

        match self.state {
            ChatState::Idle => {}
            ChatState::Sending => self.dispatch(),
            ChatState::AwaitingResponse => {
                if let Some(result) = self.pending.as_ref().and_then(|p| p.try_result()) {
                    self.finish(result);
                }
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) {
        if self.pending.take().is_some() {
            debug!("Discarding in-flight chat request");
        }
        self.typing.stop();
        self.visible = false;
        self.closed = true;
    }
}

fn create(context: PluginContext) -> Box<dyn PluginWindow> {
    Box::new(ChatWindow::new(context.config))
}

/// Registration entry point for the Pilot plugin
pub fn register() -> Result<PluginManifest, PluginError> {
    Ok(PluginManifest::new(PLUGIN_NAME, create))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigManager, LlmProvider};
    use crate::providers::mock::MockProvider;
    use crate::providers::{ChatProvider, NOT_IMPLEMENTED_REPLY};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn shared_config(dir: &TempDir, llm: LlmProvider, api_key: &str) -> SharedConfig {
        let mut manager = ConfigManager::new(dir.path().join("config.json"));
        manager.config_mut().llm = llm;
        manager.config_mut().api_key = api_key.to_string();
        manager.into_shared()
    }

    fn mock_resolver(provider: Arc<MockProvider>) -> ProviderResolver {
        Arc::new(move |_config: &Config| -> Result<Arc<dyn ChatProvider>, ProviderError> {
            Ok(provider.clone())
        })
    }

    fn wait_until_idle(window: &mut ChatWindow) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            window.poll(Instant::now());
            if window.state() == ChatState::Idle {
                return;
            }
            assert!(Instant::now() < deadline, "chat window never became idle");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_new_window_greets() {
        let dir = TempDir::new().unwrap();
        let window = ChatWindow::new(shared_config(&dir, LlmProvider::Gemini, ""));

        assert_eq!(window.state(), ChatState::Idle);
        assert!(window.input_enabled());
        assert_eq!(window.transcript().len(), 1);
        assert_eq!(window.transcript().last().unwrap().sender, Sender::Ai);
        assert_eq!(window.transcript().last().unwrap().text, GREETING);
        assert!(window.typing_text().is_none());
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let resolver: ProviderResolver = Arc::new(
            move |_config: &Config| -> Result<Arc<dyn ChatProvider>, ProviderError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MockProvider::reply("unused")))
            },
        );
        let mut window =
            ChatWindow::with_resolver(shared_config(&dir, LlmProvider::Gemini, "k"), resolver);

        assert!(!window.submit(""));
        assert!(!window.submit("   \t \n"));
        window.poll(Instant::now());

        assert_eq!(window.transcript().len(), 1);
        assert_eq!(window.state(), ChatState::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_api_key_reports_system_error() {
        let dir = TempDir::new().unwrap();
        let mut window = ChatWindow::new(shared_config(&dir, LlmProvider::Gemini, ""));

        assert!(window.submit("hi"));
        assert_eq!(window.state(), ChatState::Sending);
        assert!(!window.input_enabled());
        assert_eq!(window.input_buffer(), "");

        window.poll(Instant::now());

        assert_eq!(window.state(), ChatState::Idle);
        assert!(window.input_enabled());
        assert_eq!(window.transcript().count_from(Sender::System), 1);
        assert_eq!(
            window.transcript().last().unwrap().text,
            "Error: API key not configured. Please set it in the settings."
        );
        assert!(window.typing_text().is_none());
    }

    #[test]
    fn test_missing_key_sends_no_request() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(MockProvider::reply("never"));
        let inner = provider.clone();
        let resolver: ProviderResolver = Arc::new(
            move |config: &Config| -> Result<Arc<dyn ChatProvider>, ProviderError> {
                if !config.has_api_key() {
                    return Err(ProviderError::MissingApiKey);
                }
                Ok(inner.clone())
            },
        );
        let mut window =
            ChatWindow::with_resolver(shared_config(&dir, LlmProvider::Gemini, ""), resolver);

        window.submit("hi");
        wait_until_idle(&mut window);

        assert_eq!(provider.call_count(), 0);
        assert_eq!(window.transcript().count_from(Sender::System), 1);
    }

    #[test]
    fn test_successful_reply_appends_ai_entry() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(MockProvider::reply("hello"));
        let mut window = ChatWindow::with_resolver(
            shared_config(&dir, LlmProvider::Gemini, "k"),
            mock_resolver(provider.clone()),
        );

        window.submit("  ping  ");
        let before = window.transcript().len();
        wait_until_idle(&mut window);

        assert_eq!(window.transcript().len(), before + 1);
        let last = window.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Ai);
        assert_eq!(last.text, "hello");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_prompt().as_deref(), Some("ping"));
        assert!(window.input_enabled());
    }

    #[test]
    fn test_provider_error_appends_system_entry() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(MockProvider::error(ProviderError::BackendError(
            "quota exceeded".to_string(),
        )));
        let mut window = ChatWindow::with_resolver(
            shared_config(&dir, LlmProvider::Gemini, "k"),
            mock_resolver(provider),
        );

        window.submit("ping");
        wait_until_idle(&mut window);

        let last = window.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::System);
        assert_eq!(last.text, "Error: API error: quota exceeded");
        assert_eq!(window.transcript().count_from(Sender::System), 1);
        assert!(window.input_enabled());
        assert_eq!(window.state(), ChatState::Idle);
    }

    #[test]
    fn test_typing_indicator_while_awaiting() {
        let dir = TempDir::new().unwrap();
        let provider =
            Arc::new(MockProvider::reply("done").with_delay(Duration::from_millis(300)));
        let mut window = ChatWindow::with_resolver(
            shared_config(&dir, LlmProvider::Gemini, "k"),
            mock_resolver(provider),
        );

        window.submit("ping");
        window.poll(Instant::now());
        assert_eq!(window.state(), ChatState::AwaitingResponse);
        assert!(window.typing_text().unwrap().starts_with("AI is typing"));
        assert!(!window.input_enabled());
        assert!(window.render().contains("AI is typing"));

        wait_until_idle(&mut window);
        assert!(window.typing_text().is_none());
        assert!(!window.render().contains("AI is typing"));
    }

    #[test]
    fn test_input_ignored_while_busy() {
        let dir = TempDir::new().unwrap();
        let provider =
            Arc::new(MockProvider::reply("first").with_delay(Duration::from_millis(100)));
        let mut window = ChatWindow::with_resolver(
            shared_config(&dir, LlmProvider::Gemini, "k"),
            mock_resolver(provider.clone()),
        );

        assert!(window.submit("one"));
        assert!(!window.submit("two"));
        wait_until_idle(&mut window);

        assert_eq!(provider.call_count(), 1);
        assert_eq!(window.transcript().count_from(Sender::You), 1);
    }

    #[test]
    fn test_unimplemented_provider_reply() {
        let dir = TempDir::new().unwrap();
        let mut window = ChatWindow::new(shared_config(&dir, LlmProvider::Grok, "k"));

        window.submit("hi");
        wait_until_idle(&mut window);

        let last = window.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Ai);
        assert_eq!(last.text, NOT_IMPLEMENTED_REPLY);
    }

    #[test]
    fn test_nul_in_configured_llm_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"llm": "bad\u0000name", "api_key": "k"}"#).unwrap();
        let manager = ConfigManager::new(&path);
        assert_eq!(
            manager.config().llm,
            LlmProvider::Other("bad\0name".to_string())
        );

        let mut window = ChatWindow::new(manager.into_shared());
        assert!(window.submit("hi"));
        wait_until_idle(&mut window);

        let last = window.transcript().last().unwrap();
        assert_eq!(last.sender, Sender::Ai);
        assert_eq!(last.text, NOT_IMPLEMENTED_REPLY);
    }

    #[test]
    fn test_config_is_read_at_send_time() {
        let dir = TempDir::new().unwrap();
        let config = shared_config(&dir, LlmProvider::Gemini, "");
        let mut window = ChatWindow::new(config.clone());

        lock_config(&config).config_mut().llm = LlmProvider::ChatGpt;
        lock_config(&config).config_mut().api_key = "now-set".to_string();

        window.submit("hi");
        wait_until_idle(&mut window);
        assert_eq!(window.transcript().last().unwrap().text, NOT_IMPLEMENTED_REPLY);
    }

    #[test]
    fn test_transcript_is_append_only() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(MockProvider::reply("ok"));
        let mut window = ChatWindow::with_resolver(
            shared_config(&dir, LlmProvider::Gemini, "k"),
            mock_resolver(provider),
        );

        for i in 0..3 {
            window.submit(&format!("message {}", i));
            wait_until_idle(&mut window);
        }

        let transcript = window.transcript();
        assert_eq!(transcript.len(), 7);
        assert_eq!(transcript.entries()[0].text, GREETING);
        assert_eq!(transcript.entries()[1].text, "message 0");
        assert_eq!(transcript.scroll_position(), 6);
    }

    #[test]
    fn test_close_discards_pending_request() {
        let dir = TempDir::new().unwrap();
        let provider =
            Arc::new(MockProvider::reply("late").with_delay(Duration::from_millis(100)));
        let mut window = ChatWindow::with_resolver(
            shared_config(&dir, LlmProvider::Gemini, "k"),
            mock_resolver(provider),
        );
        window.show();
        assert!(window.is_visible());

        window.submit("ping");
        window.poll(Instant::now());
        window.close();

        assert!(window.is_closed());
        assert!(!window.is_visible());
        std::thread::sleep(Duration::from_millis(200));
        window.poll(Instant::now());
        assert_eq!(window.transcript().count_from(Sender::Ai), 1);
        assert!(!window.submit("after close"));
    }

    #[test]
    fn test_typing_indicator_frames() {
        let start = Instant::now();
        let mut indicator = TypingIndicator::default();
        assert!(indicator.text(start).is_none());

        indicator.start(start);
        assert!(indicator.is_active());
        assert_eq!(indicator.text(start).unwrap(), "AI is typing");
        assert_eq!(indicator.dots(start + Duration::from_millis(399)), 0);
        assert_eq!(indicator.dots(start + Duration::from_millis(400)), 1);
        assert_eq!(indicator.dots(start + Duration::from_millis(800)), 2);
        assert_eq!(
            indicator.text(start + Duration::from_millis(1200)).unwrap(),
            "AI is typing..."
        );
        assert_eq!(indicator.dots(start + Duration::from_millis(1600)), 0);

        indicator.stop();
        assert!(!indicator.is_active());
        assert_eq!(indicator.dots(start + Duration::from_millis(400)), 0);
    }

    #[test]
    fn test_register_manifest() {
        let descriptor = register().unwrap().validate().unwrap();
        assert_eq!(descriptor.name(), PLUGIN_NAME);
    }
}
