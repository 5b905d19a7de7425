/*!
   Turning poll outcomes into test assertions.

   A poll reports a missing event as a [`Timeout`](ErrorDetail::Timeout).
   In a test, that outcome usually means the relayer did not do its job, so
   the helpers below convert it into an assertion failure with a message
   naming what was expected, while passing every other failure through.
*/

use core::fmt::Debug;

use crate::error::{Error, ErrorDetail};

/// Assert that the polled event was observed.
pub fn assert_observed<T>(what: &str, result: Result<T, Error>) -> Result<T, Error> {
    match result {
        Ok(res) => Ok(res),
        Err(e) => match e.detail() {
            ErrorDetail::Timeout(timeout) => Err(Error::assertion(format!(
                "expected {} on chain {} between heights {} and {}, but it was never observed",
                what, timeout.chain_id, timeout.start, timeout.end
            ))),
            _ => Err(e),
        },
    }
}

/// Assert that no matching event was observed in the polled range.
pub fn assert_not_observed<T: Debug>(what: &str, result: Result<T, Error>) -> Result<(), Error> {
    match result {
        Ok(res) => Err(Error::assertion(format!(
            "expected no {what}, but observed {res:?}"
        ))),
        Err(e) if e.is_timeout() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::height::BlockHeight;

    fn timeout() -> Error {
        Error::timeout("gaia-1".into(), BlockHeight::new(10), BlockHeight::new(20))
    }

    #[test]
    fn missing_event_becomes_assertion() {
        let err = assert_observed::<()>("packet acknowledgement", Err(timeout())).unwrap_err();

        match err.detail() {
            ErrorDetail::Assertion(e) => {
                assert!(e.message.contains("packet acknowledgement"));
                assert!(e.message.contains("between heights 10 and 20"));
            }
            _ => panic!("expected assertion failure, got: {err}"),
        }
    }

    #[test]
    fn other_failures_pass_through() {
        let cancelled = Error::cancelled("gaia-1".into(), BlockHeight::new(12), true);
        let err = assert_observed::<()>("packet acknowledgement", Err(cancelled)).unwrap_err();

        assert!(err.is_cancelled());
    }

    #[test]
    fn not_observed() {
        assert!(assert_not_observed::<()>("query response", Err(timeout())).is_ok());
        assert!(assert_not_observed("query response", Ok(42)).is_err());
    }
}
