//! Helper module with the options for timed console reads.
//!
//! This module provides the options for a [`TimedLineReader`] and the
//! corresponding builder.
//!
//!
//! # Example
//!
//! ```
//! # use std::time::Duration;
//! # use promptty::opt::{Options, Strategy};
//! let options = Options::builder()
//!     .strategy(Strategy::Polling)
//!     .poll_interval(Duration::from_millis(20))
//!     .build();
//!
//! assert_eq!(options.strategy(), Strategy::Polling);
//! assert_eq!(options.poll_interval(), Duration::from_millis(20));
//! ```
//!
//! [`TimedLineReader`]: crate::TimedLineReader

use std::time::Duration;

/// The waiting strategy for reads with a timeout.
///
/// Currently two strategies are supported, with a third option picking
/// whichever fits the platform:
///
///   * __Alarm__ arms a one-shot interval timer and then performs a single
///     blocking line read. If the timer fires first, the read is interrupted
///     and the call resolves to the default. Since the read is atomic, the
///     deadline is a hard cap measured from the start of the call. This
///     strategy requires `SIGALRM` and hence is available on Unix only.
///
///   * __Polling__ checks for pending keystrokes at a short, fixed interval
///     and accumulates them into a line. Every keystroke extends the deadline,
///     which makes the timeout an idle timeout. On expiry, partial input is
///     returned as the line. This strategy requires a console that can be
///     peeked for keystrokes without blocking.
///
///   * __Auto__ selects alarm on Unix and polling on Windows. This is the
///     default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Pick the strategy native to the platform.
    #[default]
    Auto,
    /// The signal-deadline strategy.
    Alarm,
    /// The cooperative polling strategy.
    Polling,
}

#[derive(Clone, Debug)]
struct OptionData {
    strategy: Strategy,
    poll_interval: Duration,
    echo: bool,
}

impl OptionData {
    pub const fn new() -> Self {
        Self {
            strategy: Strategy::Auto,
            poll_interval: Duration::from_millis(40),
            echo: true,
        }
    }
}

/// A builder of options objects.
#[derive(Debug)]
pub struct OptionBuilder(OptionData);

impl OptionBuilder {
    /// Set the waiting strategy.
    pub fn strategy(&mut self, strategy: Strategy) -> &mut Self {
        self.0.strategy = strategy;
        self
    }

    /// Set the interval between keystroke checks of the polling strategy.
    ///
    /// A zero interval is bumped to one millisecond, so that polling never
    /// degenerates into busy waiting.
    pub fn poll_interval(&mut self, interval: Duration) -> &mut Self {
        self.0.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set whether the polling strategy echoes keystrokes.
    ///
    /// The alarm strategy relies on the terminal's own line editor, which
    /// echoes on its own.
    pub fn echo(&mut self, echo: bool) -> &mut Self {
        self.0.echo = echo;
        self
    }

    /// Instantiate the options.
    pub fn build(&self) -> Options {
        Options(self.0.clone())
    }
}

/// An options object.
#[derive(Clone, Debug)]
pub struct Options(OptionData);

impl Default for Options {
    fn default() -> Self {
        Options(OptionData::new())
    }
}

impl Options {
    /// Create a new builder with the default option values.
    pub fn builder() -> OptionBuilder {
        OptionBuilder(OptionData::new())
    }

    /// Get the waiting strategy.
    pub fn strategy(&self) -> Strategy {
        self.0.strategy
    }

    /// Get the interval between keystroke checks.
    pub fn poll_interval(&self) -> Duration {
        self.0.poll_interval
    }

    /// Determine whether keystrokes are echoed by the polling strategy.
    pub fn echo(&self) -> bool {
        self.0.echo
    }
}
