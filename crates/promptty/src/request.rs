//! Prompt requests and their results.
//!
//! A [`PromptRequest`] bundles everything a single timed read needs: the
//! prompt text, the acceptable responses, the default value, the timeout, and
//! whether trailing arguments are split off. Requests are immutable; use
//! [`PromptRequest::builder`] to create one.
//!
//!
//! # Example
//!
//! ```
//! # use std::time::Duration;
//! # use promptty::request::{PromptRequest, YES_NO};
//! let request = PromptRequest::builder("Continue (y/n)? ")
//!     .accept(YES_NO)
//!     .default("n")
//!     .timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert!(request.accepts("y"));
//! assert!(!request.accepts("maybe"));
//! assert_eq!(request.default(), Some("n"));
//! ```

use std::time::Duration;

/// The acceptable responses for a yes/no question.
pub const YES_NO: [&str; 4] = ["Y", "y", "N", "n"];

#[derive(Clone, Debug, Default)]
struct RequestData {
    prompt: String,
    acceptable: Vec<String>,
    default: Option<String>,
    timeout: Option<Duration>,
    split_arguments: bool,
}

/// A builder of prompt requests.
#[derive(Debug)]
pub struct PromptBuilder(RequestData);

impl PromptBuilder {
    /// Add acceptable responses.
    ///
    /// If no responses are added, any response is acceptable, including the
    /// empty string.
    pub fn accept<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.acceptable.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Set the default value returned when the timeout expires.
    pub fn default<S: Into<String>>(&mut self, value: S) -> &mut Self {
        self.0.default = Some(value.into());
        self
    }

    /// Set the timeout.
    ///
    /// Without a timeout, a read blocks until the user completes a line.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.0.timeout = Some(timeout);
        self
    }

    /// Set whether to split trailing arguments off the response.
    pub fn split_arguments(&mut self, split: bool) -> &mut Self {
        self.0.split_arguments = split;
        self
    }

    /// Instantiate the request.
    pub fn build(&self) -> PromptRequest {
        PromptRequest(self.0.clone())
    }
}

/// A request for one line of console input.
#[derive(Clone, Debug)]
pub struct PromptRequest(RequestData);

impl PromptRequest {
    /// Create a new builder for a request with the given prompt.
    pub fn builder<S: Into<String>>(prompt: S) -> PromptBuilder {
        PromptBuilder(RequestData {
            prompt: prompt.into(),
            ..RequestData::default()
        })
    }

    /// Get the prompt text.
    pub fn prompt(&self) -> &str {
        &self.0.prompt
    }

    /// Get the acceptable responses.
    pub fn acceptable(&self) -> &[String] {
        &self.0.acceptable
    }

    /// Get the default value.
    pub fn default(&self) -> Option<&str> {
        self.0.default.as_deref()
    }

    /// Get the timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.0.timeout
    }

    /// Determine whether trailing arguments are split off.
    pub fn splits_arguments(&self) -> bool {
        self.0.split_arguments
    }

    /// Determine whether the candidate response is acceptable.
    ///
    /// This method is a pure function of the request and the candidate, so
    /// the same candidate always yields the same decision.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.0.acceptable.is_empty() || self.0.acceptable.iter().any(|token| token == candidate)
    }

    /// Turn a raw line into a result.
    ///
    /// When splitting arguments, the first whitespace-delimited token becomes
    /// the response and the remaining tokens become the arguments. A line
    /// without any tokens is kept as the response, with no arguments.
    pub fn interpret(&self, line: String) -> PromptResult {
        if !self.0.split_arguments {
            return PromptResult {
                response: line,
                arguments: None,
            };
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(first) => PromptResult {
                response: first.to_owned(),
                arguments: Some(tokens.map(str::to_owned).collect()),
            },
            None => PromptResult {
                response: line,
                arguments: Some(Vec::new()),
            },
        }
    }

    /// Create the result for an expired deadline.
    ///
    /// The default is returned as is. It is neither split nor checked against
    /// the acceptable responses.
    pub(crate) fn expire(&self) -> Option<PromptResult> {
        self.0.default.as_ref().map(|default| PromptResult {
            response: default.clone(),
            arguments: self.0.split_arguments.then(Vec::new),
        })
    }
}

/// The result of a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptResult {
    response: String,
    arguments: Option<Vec<String>>,
}

impl PromptResult {
    /// Get the response.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Get the trailing arguments, if they were requested.
    pub fn arguments(&self) -> Option<&[String]> {
        self.arguments.as_deref()
    }

    /// Convert into the response alone.
    pub fn into_response(self) -> String {
        self.response
    }

    /// Convert into the response and trailing arguments.
    ///
    /// If trailing arguments were not requested, the list is empty.
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.response, self.arguments.unwrap_or_default())
    }
}

// =====================================================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accept_anything() {
        let request = PromptRequest::builder("> ").build();
        assert!(request.accepts("anything"));
        assert!(request.accepts(""));
    }

    #[test]
    fn test_accept_is_stable() {
        let request = PromptRequest::builder("> ").accept(["y", "n"]).build();
        for candidate in ["y", "n", "Y", "", "yes"] {
            let first = request.accepts(candidate);
            for _ in 0..3 {
                assert_eq!(request.accepts(candidate), first, "candidate {:?}", candidate);
            }
        }
        assert!(request.accepts("y"));
        assert!(!request.accepts("Y"));
    }

    #[test]
    fn test_split_arguments() {
        let request = PromptRequest::builder("> ").split_arguments(true).build();

        let result = request.interpret("y extra stuff".to_owned());
        assert_eq!(result.response(), "y");
        assert_eq!(
            result.arguments(),
            Some(["extra".to_owned(), "stuff".to_owned()].as_slice())
        );

        let result = request.interpret("y".to_owned());
        assert_eq!(result.response(), "y");
        assert_eq!(result.arguments(), Some([].as_slice()));

        let result = request.interpret("   ".to_owned());
        assert_eq!(result.response(), "   ");
        assert_eq!(result.arguments(), Some([].as_slice()));
    }

    #[test]
    fn test_no_split() {
        let request = PromptRequest::builder("> ").build();
        let result = request.interpret("y extra stuff".to_owned());
        assert_eq!(result.response(), "y extra stuff");
        assert_eq!(result.arguments(), None);
        assert_eq!(result.into_parts(), ("y extra stuff".to_owned(), Vec::new()));
    }

    #[test]
    fn test_expire() {
        let request = PromptRequest::builder("> ")
            .accept(["y"])
            .default("not acceptable")
            .split_arguments(true)
            .build();
        let result = request.expire().expect("default is set");
        assert_eq!(result.response(), "not acceptable");
        assert_eq!(result.arguments(), Some([].as_slice()));

        let request = PromptRequest::builder("> ").build();
        assert_eq!(request.expire(), None);
    }
}
