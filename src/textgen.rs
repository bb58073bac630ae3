//  ____  ____     __        __    __  __           _
// |  _ \|  _ \ __ \ \      / /__ |  \/  | __ _ ___| |_ ___ _ __
// | |_) | |_) / _` \ \/\ / / _ \| |\/| |/ _` / __| __/ _ \ '__|
// |  _ <|  __/ (_| |\ V  V / (_) | |  | | (_| \__ \ ||  __/ |
// |_| \_\_|   \__,_| \_/\_/ \___/|_|  |_|\__,_|___/\__\___|_|
//
// Author : Sidney Zhang <zly@lyzhang.me>
// Date : 2025-11-02
// Version : 0.1.0
// License : Mulan PSL v2
//
// External text generators

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use log::{debug, warn};

/// How long an external generator may run before it is killed.
pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("External generation failed: {0}")]
pub struct ExternalGenerationFailure(pub String);

/// Anything that turns a prompt into a ready-made password string.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ExternalGenerationFailure>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> Result<String, ExternalGenerationFailure>,
{
    fn generate(&self, prompt: &str) -> Result<String, ExternalGenerationFailure> {
        self(prompt)
    }
}

/// Runs an external program, prompt on stdin, password on stdout.
#[derive(Debug, Clone)]
pub struct CommandTextGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTextGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_GENERATOR_TIMEOUT,
        }
    }

    /// First element is the program, the rest its arguments.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // 轮询子进程，超时则终止
    fn wait_until_deadline(&self, child: &mut Child) -> Result<ExitStatus, ExternalGenerationFailure> {
        // an unrepresentable deadline means no deadline
        let deadline = Instant::now().checked_add(self.timeout);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if deadline.is_some_and(|d| Instant::now() >= d) => {
                    warn!("'{}' exceeded {:?}, killing it", self.program, self.timeout);
                    reap(child);
                    return Err(ExternalGenerationFailure(format!(
                        "'{}' timed out after {:?}",
                        self.program, self.timeout
                    )));
                },
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    reap(child);
                    return Err(ExternalGenerationFailure(format!("Failed to wait for '{}': {}", self.program, e)));
                },
            }
        }
    }
}

impl TextGenerator for CommandTextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ExternalGenerationFailure> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExternalGenerationFailure(format!("Failed to start '{}': {}", self.program, e)))?;

        // stdin and the output pipes are serviced off-thread so a child that
        // ignores its input, or floods its output, cannot stall the wait
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_owned();
            thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });
        let stdout = read_pipe(child.stdout.take());
        let stderr = read_pipe(child.stderr.take());

        let status = self.wait_until_deadline(&mut child)?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {},
                // the child exited without reading the whole prompt
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("'{}' closed stdin before reading the prompt", self.program);
                },
                Ok(Err(e)) => {
                    return Err(ExternalGenerationFailure(format!("Failed to send prompt: {}", e)));
                },
                Err(_) => {
                    return Err(ExternalGenerationFailure("Prompt writer panicked".to_string()));
                },
            }
        }

        let stdout = join_pipe(stdout)?;
        let stderr = join_pipe(stderr)?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(ExternalGenerationFailure(format!(
                "'{}' exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        clean_generated_text(&stdout)
            .ok_or_else(|| ExternalGenerationFailure("Generator returned no password".to_string()))
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_pipe(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>, ExternalGenerationFailure> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .map_err(|_| ExternalGenerationFailure("Output reader panicked".to_string()))?
            .map_err(|e| ExternalGenerationFailure(format!("Failed to read output: {}", e))),
    }
}

/// Strips code fences and wrapping quotes, keeps the first non-empty line.
pub fn clean_generated_text(raw: &str) -> Option<String> {
    let without_fences = raw.replace("```", "");
    let line = without_fences.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line.strip_prefix(['"', '\'']).unwrap_or(line);
    let line = line.strip_suffix(['"', '\'']).unwrap_or(line);
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
