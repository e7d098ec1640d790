use super::{CommandError, CommandRunner, RunOptions};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Scripted command runner for tests
///
/// Replies are queued per argument line (`"rt build-publish --dry-run"`).
/// A call with nothing queued succeeds with empty stdout. Every call is
/// recorded, optionally together with the value one environment variable had
/// at the moment of the call.
pub struct MockCommandRunner {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    calls: Mutex<Vec<RecordedCall>>,
    watched_env: Option<String>,
}

#[derive(Debug, Clone)]
pub enum MockReply {
    Output(String),
    Error(CommandError),
    Panic(String),
}

impl MockReply {
    pub fn output(stdout: impl Into<String>) -> Self {
        MockReply::Output(stdout.into())
    }

    pub fn failure(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockReply::Error(CommandError::NonZeroExit {
            command: command.into(),
            code: Some(1),
            stderr: stderr.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub args: Vec<String>,
    pub options: RunOptions,
    /// Value of the watched variable during the call; `None` when nothing is
    /// watched, `Some(None)` when it was unset
    pub watched_env: Option<Option<String>>,
}

impl RecordedCall {
    pub fn line(&self) -> String {
        self.args.join(" ")
    }
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            watched_env: None,
        }
    }

    /// Record the value of `key` on every call
    pub fn watching_env(mut self, key: impl Into<String>) -> Self {
        self.watched_env = Some(key.into());
        self
    }

    pub fn add_reply(&self, args: &[&str], reply: MockReply) {
        self.replies
            .lock()
            .unwrap()
            .entry(args.join(" "))
            .or_default()
            .push_back(reply);
    }

    pub fn with_reply(self, args: &[&str], reply: MockReply) -> Self {
        self.add_reply(args, reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Argument lines of all calls, in order
    pub fn call_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::line).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn was_called(&self, args: &[&str]) -> bool {
        let line = args.join(" ");
        self.call_lines().iter().any(|l| *l == line)
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, args: &[&str], options: &RunOptions) -> Result<String, CommandError> {
        let line = args.join(" ");
        let watched_env = self
            .watched_env
            .as_ref()
            .map(|key| std::env::var(key).ok());

        self.calls.lock().unwrap().push(RecordedCall {
            args: args.iter().map(|a| a.to_string()).collect(),
            options: options.clone(),
            watched_env,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&line)
            .and_then(VecDeque::pop_front);

        match reply {
            None => Ok(String::new()),
            Some(MockReply::Output(stdout)) => Ok(stdout),
            Some(MockReply::Error(err)) => Err(err),
            Some(MockReply::Panic(message)) => panic!("{}", message),
        }
    }
}
