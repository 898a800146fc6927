//! terminal utils

use std::{
    io::{self, IsTerminal, prelude::*},
    sync::{
        LazyLock,
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

/// Some spinners
// https://github.com/gernest/wow/blob/master/spin/spinners.go
pub static SPINNERS: &[&[&str]] = &[
    &["⠃", "⠊", "⠒", "⠢", "⠆", "⠰", "⠔", "⠒", "⠑", "⠘"],
    &[" ", "⠁", "⠉", "⠙", "⠚", "⠖", "⠦", "⠤", "⠠"],
    &["┤", "┘", "┴", "└", "├", "┌", "┬", "┐"],
    &["▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸"],
    &[" ", "▘", "▀", "▜", "█", "▟", "▄", "▖"],
];

static TERM_SETTINGS: LazyLock<TermSettings> = LazyLock::new(TermSettings::from_env);

/// Helper type to determine the current tty
pub struct TermSettings {
    indicate_progress: bool,
}

impl TermSettings {
    pub fn from_env() -> Self {
        Self { indicate_progress: io::stdout().is_terminal() }
    }
}

/// A spinner used within the reporter thread to indicate progress.
pub struct Spinner {
    indicator: &'static [&'static str],
    no_progress: bool,
    message: String,
    idx: usize,
}

impl Spinner {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_indicator(SPINNERS[0], msg)
    }

    pub fn with_indicator(indicator: &'static [&'static str], msg: impl Into<String>) -> Self {
        Self {
            indicator,
            no_progress: !TERM_SETTINGS.indicate_progress,
            message: msg.into(),
            idx: 0,
        }
    }

    pub fn tick(&mut self) {
        if self.no_progress {
            return;
        }

        self.idx %= self.indicator.len();
        print!("\r\x1b[2K\x1b[1m[\x1b[32m{}\x1b[0;1m]\x1b[0m {}", self.indicator[self.idx], self.message);
        io::stdout().flush().unwrap();
        self.idx += 1;
    }

    /// Clears the spinner line and prints the given line above it.
    pub fn print_line(&mut self, line: impl AsRef<str>) {
        if self.no_progress {
            println!("{}", line.as_ref());
            return;
        }
        print!("\r\x1b[2K{}\n", line.as_ref());
        self.tick();
    }

    pub fn done(&self) {
        if self.no_progress {
            println!("{}", self.message);
            return;
        }
        println!("\r\x1b[2K\x1b[1m[\x1b[32m+\x1b[0;1m]\x1b[0m {}", self.message);
        io::stdout().flush().unwrap();
    }

    pub fn finish(&mut self, msg: impl Into<String>) {
        self.message(msg);
        self.done();
    }

    pub fn clear(&self) {
        if self.no_progress {
            return;
        }
        print!("\r\x1b[2K");
        io::stdout().flush().unwrap();
    }

    pub fn message(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }
}

enum SpinnerMsg {
    /// Replace the spinner message.
    Message(String),
    /// Print a line above the spinner.
    Line(String),
    /// Finish with a final message and stop ticking.
    Finish(String),
    Shutdown(mpsc::Sender<()>),
}

/// Drives a [`Spinner`] on a separate thread so progress keeps animating
/// while the caller awaits transactions.
///
/// The spinner is cleared when the reporter is dropped.
pub struct SpinnerReporter {
    sender: mpsc::Sender<SpinnerMsg>,
}

impl SpinnerReporter {
    /// Spawns the reporter thread with an initial message.
    pub fn spawn(msg: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::channel::<SpinnerMsg>();

        let mut spinner = Spinner::new(msg);
        thread::Builder::new()
            .name("spinner".into())
            .spawn(move || loop {
                spinner.tick();
                match receiver.recv_timeout(Duration::from_millis(100)) {
                    Ok(SpinnerMsg::Message(msg)) => spinner.message(msg),
                    Ok(SpinnerMsg::Line(line)) => spinner.print_line(line),
                    Ok(SpinnerMsg::Finish(msg)) => {
                        spinner.finish(msg);
                        // wait for the shutdown ack
                        if let Ok(SpinnerMsg::Shutdown(ack)) = receiver.recv() {
                            let _ = ack.send(());
                        }
                        break;
                    }
                    Ok(SpinnerMsg::Shutdown(ack)) => {
                        spinner.clear();
                        let _ = ack.send(());
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => {
                        spinner.clear();
                        break;
                    }
                }
            })
            .expect("failed to spawn spinner thread");

        Self { sender }
    }

    /// Replaces the spinner message.
    pub fn set_message(&self, msg: impl Into<String>) {
        let _ = self.sender.send(SpinnerMsg::Message(msg.into()));
    }

    /// Prints a line above the spinner without stopping it.
    pub fn print_line(&self, line: impl Into<String>) {
        let _ = self.sender.send(SpinnerMsg::Line(line.into()));
    }

    /// Stops the spinner with a final success message.
    pub fn finish(&self, msg: impl Into<String>) {
        let _ = self.sender.send(SpinnerMsg::Finish(msg.into()));
    }
}

impl Drop for SpinnerReporter {
    fn drop(&mut self) {
        let (ack, rx) = mpsc::channel();
        if self.sender.send(SpinnerMsg::Shutdown(ack)).is_ok() {
            let _ = rx.recv();
        }
    }
}
