//! Asking the operator whether to continue after control-c.
//!
//! An [`InterruptPolicy`] replaces the process's default reaction to
//! control-c, which is immediate termination, with a prompt. Once installed,
//! interrupts are only recorded. The application checks for them at points
//! where it is safe to stop, and the policy then asks whether to continue or
//! exit. Without an answer within the timeout, it exits.
//!
//!
//! # Example
//!
//! ```no_run
//! # use promptty::{InterruptPolicy, TimedLineReader};
//! let policy = InterruptPolicy::default();
//! let _guard = policy.install()?;
//! let mut reader = TimedLineReader::open()?;
//!
//! for _ in 0..1_000 {
//!     // Do some work...
//!     policy.check(&mut reader);
//! }
//! # Ok::<(), promptty::err::Error>(())
//! ```

use std::io::Write;
use std::time::Duration;

use log::{debug, warn};

use crate::err::Result;
use crate::request::PromptRequest;
use crate::sys::{self, InterruptHandler};
use crate::TimedLineReader;

/// The operator's decision after an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Exit,
}

impl Decision {
    /// Determine the decision for a response.
    ///
    /// An `e` in either case means exit. Everything else means continue.
    pub fn from_response(response: &str) -> Self {
        if response.eq_ignore_ascii_case("e") {
            Self::Exit
        } else {
            Self::Continue
        }
    }
}

/// A policy for handling control-c.
#[derive(Clone, Debug)]
pub struct InterruptPolicy {
    request: PromptRequest,
}

impl Default for InterruptPolicy {
    /// Create the default policy.
    ///
    /// It asks `Ctrl-C, Continue or Exit (c,e)?` and exits after 10 seconds
    /// without answer.
    fn default() -> Self {
        Self::new(
            PromptRequest::builder("\nCtrl-C, Continue or Exit (c,e)? ")
                .accept(["C", "c", "E", "e"])
                .default("e")
                .timeout(Duration::from_secs(10))
                .build(),
        )
    }
}

impl InterruptPolicy {
    /// Create a new policy with the given prompt request.
    ///
    /// Responses are interpreted with [`Decision::from_response`].
    pub fn new(request: PromptRequest) -> Self {
        Self { request }
    }

    /// Get the prompt request.
    pub fn request(&self) -> &PromptRequest {
        &self.request
    }

    /// Install the policy's interrupt handler.
    ///
    /// The handler only records interrupts. Dropping the returned guard
    /// restores the previous handler. Only one guard may exist at a time,
    /// otherwise this method fails with
    /// [`ErrorKind::InFlight`](crate::err::ErrorKind::InFlight).
    pub fn install(&self) -> Result<InterruptGuard> {
        let handler = InterruptHandler::install()?;
        debug!("installed interrupt handler");
        Ok(InterruptGuard { _handler: handler })
    }

    /// Consume a recorded interrupt.
    pub fn pending(&self) -> bool {
        InterruptHandler::take_pending()
    }

    /// Ask the operator whether to continue or exit.
    pub fn escalate<W: Write>(&self, reader: &mut TimedLineReader<W>) -> Result<Decision> {
        let result = reader.read(&self.request)?;
        let decision = Decision::from_response(result.response());
        debug!("interrupt escalated to {:?}", decision);
        Ok(decision)
    }

    /// Handle a recorded interrupt, if any.
    ///
    /// If the operator decides to exit or prompting fails, this method
    /// terminates the process right away with exit code 1. It neither unwinds
    /// the stack nor runs exit handlers.
    pub fn check<W: Write>(&self, reader: &mut TimedLineReader<W>) {
        if !self.pending() {
            return;
        }

        match self.escalate(reader) {
            Ok(Decision::Continue) => (),
            Ok(Decision::Exit) => sys::exit_now(1),
            Err(error) => {
                warn!("exiting after failed interrupt prompt: {}", error);
                sys::exit_now(1)
            }
        }
    }
}

/// An installed interrupt policy.
///
/// Dropping the guard restores the previous handler.
#[derive(Debug)]
pub struct InterruptGuard {
    _handler: InterruptHandler,
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::err::ErrorKind;
    use crate::opt::Options;
    use crate::wait::test::Script;
    use crate::wait::PollingWait;

    fn reader(script: Script) -> TimedLineReader<Vec<u8>> {
        let options = Options::builder()
            .poll_interval(Duration::from_millis(5))
            .build();
        TimedLineReader::with_strategy(PollingWait::new(script, &options), Vec::new())
    }

    fn policy(timeout: Duration) -> InterruptPolicy {
        InterruptPolicy::new(
            PromptRequest::builder("continue or exit? ")
                .accept(["C", "c", "E", "e"])
                .default("e")
                .timeout(timeout)
                .build(),
        )
    }

    #[test]
    fn test_decision() {
        assert_eq!(Decision::from_response("e"), Decision::Exit);
        assert_eq!(Decision::from_response("E"), Decision::Exit);
        assert_eq!(Decision::from_response("c"), Decision::Continue);
        assert_eq!(Decision::from_response("C"), Decision::Continue);
    }

    #[test]
    fn test_default_policy() {
        let policy = InterruptPolicy::default();
        assert_eq!(policy.request().default(), Some("e"));
        assert_eq!(policy.request().timeout(), Some(Duration::from_secs(10)));
        assert!(policy.request().accepts("C"));
        assert!(!policy.request().accepts("x"));
    }

    #[test]
    fn test_escalate() -> Result<()> {
        let policy = policy(Duration::from_secs(1));
        let mut reader = reader(Script::typing("x\nc\n"));
        assert_eq!(policy.escalate(&mut reader)?, Decision::Continue);

        let mut reader = self::reader(Script::typing("E\n"));
        assert_eq!(policy.escalate(&mut reader)?, Decision::Exit);
        Ok(())
    }

    #[test]
    fn test_escalate_times_out_to_exit() -> Result<()> {
        let policy = policy(Duration::from_millis(30));
        let mut reader = reader(Script::default());
        assert_eq!(policy.escalate(&mut reader)?, Decision::Exit);
        Ok(())
    }

    #[test]
    fn test_single_guard() -> Result<()> {
        let policy = InterruptPolicy::default();
        let guard = policy.install()?;
        let second = policy.install();
        assert_eq!(second.map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::InFlight));
        assert!(!policy.pending());
        drop(guard);

        let _guard = policy.install()?;
        Ok(())
    }
}
