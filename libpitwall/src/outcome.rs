//! Three-state outcome of a data operation
//!
//! Every repository and use-case call answers with an [`Outcome`]: the value,
//! a classified error, or a marker that the value is still being produced.

use crate::error::NetworkError;

/// Message attached to the synthetic error produced when `Loading` is folded
/// without a loading branch.
pub const STILL_LOADING: &str = "Loading";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Error {
        cause: NetworkError,
        message: Option<String>,
    },
    Loading,
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn error(cause: NetworkError, message: Option<String>) -> Self {
        Outcome::Error { cause, message }
    }

    pub fn loading() -> Self {
        Outcome::Loading
    }

    /// Error outcome whose message is the classified error's user message
    pub fn from_network_error(cause: NetworkError) -> Self {
        let message = Some(cause.user_message());
        Outcome::Error { cause, message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Outcome::Loading)
    }

    /// Collapse to a single value.
    ///
    /// `Loading` is routed to `on_error` with a synthetic cause so it is
    /// never silently dropped. Use [`Outcome::fold_all`] to handle it
    /// separately.
    pub fn fold<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_error: impl FnOnce(NetworkError, Option<String>) -> R,
    ) -> R {
        match self {
            Outcome::Success(value) => on_success(value),
            Outcome::Error { cause, message } => on_error(cause, message),
            Outcome::Loading => on_error(NetworkError::unknown(STILL_LOADING), None),
        }
    }

    pub fn fold_all<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_error: impl FnOnce(NetworkError, Option<String>) -> R,
        on_loading: impl FnOnce() -> R,
    ) -> R {
        match self {
            Outcome::Success(value) => on_success(value),
            Outcome::Error { cause, message } => on_error(cause, message),
            Outcome::Loading => on_loading(),
        }
    }

    /// Run `action` on the success value, passing the outcome through
    pub fn on_success(self, action: impl FnOnce(&T)) -> Self {
        if let Outcome::Success(value) = &self {
            action(value);
        }
        self
    }

    /// Run `action` on the error, passing the outcome through
    pub fn on_error(self, action: impl FnOnce(&NetworkError, Option<&str>)) -> Self {
        if let Outcome::Error { cause, message } = &self {
            action(cause, message.as_deref());
        }
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Error { cause, message } => Outcome::Error { cause, message },
            Outcome::Loading => Outcome::Loading,
        }
    }

    /// Chain a dependent computation. Errors and `Loading` short-circuit:
    /// `f` never runs on a failed input.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Error { cause, message } => Outcome::Error { cause, message },
            Outcome::Loading => Outcome::Loading,
        }
    }

    /// Message to show for an error outcome: the explicit message, else the
    /// cause's user message
    pub fn error_message(&self) -> Option<String> {
        match self {
            Outcome::Error { cause, message } => {
                Some(message.clone().unwrap_or_else(|| cause.user_message()))
            }
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Error { cause, message } => Outcome::Error {
                cause: cause.clone(),
                message: message.clone(),
            },
            Outcome::Loading => Outcome::Loading,
        }
    }
}

impl<T> From<std::result::Result<T, NetworkError>> for Outcome<T> {
    fn from(result: std::result::Result<T, NetworkError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(cause) => Outcome::from_network_error(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fold_success() {
        let outcome = Outcome::success(41);
        let folded = outcome.fold(|v| v + 1, |_, _| 0);
        assert_eq!(folded, 42);
    }

    #[test]
    fn test_fold_error_passes_cause_and_message() {
        let outcome: Outcome<i32> =
            Outcome::error(NetworkError::timeout(), Some("slow".to_string()));
        let folded = outcome.fold(
            |_| String::new(),
            |cause, message| format!("{}|{}", cause, message.unwrap()),
        );
        assert_eq!(folded, "Request timeout|slow");
    }

    #[test]
    fn test_fold_without_loading_branch_treats_loading_as_error() {
        let outcome: Outcome<i32> = Outcome::loading();
        let folded = outcome.fold(|_| "success".to_string(), |cause, _| cause.user_message());
        assert_eq!(folded, STILL_LOADING);
    }

    #[test]
    fn test_fold_all_routes_loading() {
        let outcome: Outcome<i32> = Outcome::Loading;
        let folded = outcome.fold_all(|_| 1, |_, _| 2, || 3);
        assert_eq!(folded, 3);
    }

    #[test]
    fn test_taps_pass_value_through() {
        let seen = Cell::new(0);
        let outcome = Outcome::success(7)
            .on_success(|v| seen.set(*v))
            .on_error(|_, _| panic!("error tap must not run on success"));
        assert_eq!(seen.get(), 7);
        assert_eq!(outcome, Outcome::Success(7));

        let errored = Cell::new(false);
        let failed: Outcome<i32> = Outcome::from_network_error(NetworkError::no_connection())
            .on_success(|_| panic!("success tap must not run on error"))
            .on_error(|_, message| {
                assert_eq!(message, Some("No internet connection"));
                errored.set(true);
            });
        assert!(errored.get());
        assert!(failed.is_error());
    }

    #[test]
    fn test_and_then_short_circuits_on_error() {
        let ran = Cell::new(false);
        let failed: Outcome<i32> = Outcome::from_network_error(NetworkError::timeout());
        let chained = failed.clone().and_then(|v| {
            ran.set(true);
            Outcome::success(v * 2)
        });
        assert!(!ran.get());
        assert_eq!(chained, failed);
    }

    #[test]
    fn test_error_message_falls_back_to_cause() {
        let outcome: Outcome<()> = Outcome::error(NetworkError::server_error(Some(500)), None);
        assert_eq!(outcome.error_message().as_deref(), Some("Server error"));
        assert_eq!(Outcome::success(()).error_message(), None);
    }

    #[test]
    fn test_from_result() {
        let ok: Outcome<u8> = Ok::<u8, NetworkError>(1).into();
        assert_eq!(ok, Outcome::Success(1));

        let err: Outcome<u8> = Err::<u8, NetworkError>(NetworkError::no_connection()).into();
        assert!(err.is_error());
        assert!(!err.is_loading());
    }
}
