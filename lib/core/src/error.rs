//! Error handling foundation for corrlinker.
//!
//! Only the `Result` alias lives here. Session, configuration and provider
//! errors are defined next to the code that raises them and travel inside a
//! rootcause [`Report`].

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_defaults_to_unit_context() {
        let ok: Result<u64> = Ok(3);
        assert_eq!(ok.ok(), Some(3));
    }
}
