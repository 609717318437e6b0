//! Logging shims
//!
//! Forward to `defmt` or `log` depending on enabled features. With neither
//! feature the arguments are still evaluated by reference so callers do not
//! trip unused-variable lints.
//!
//! The wrappers are `log_*` because a re-exported `warn` macro is ambiguous
//! with the built-in `#[warn]` attribute.

macro_rules! zap_log {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($fmt $(, $arg)*);
        #[cfg(feature = "log")]
        ::log::$level!($fmt $(, $arg)*);
        #[cfg(not(any(feature = "defmt", feature = "log")))]
        {
            $( let _ = &$arg; )*
        }
    }};
}

macro_rules! log_debug {
    ($($t:tt)*) => { $crate::internal::logging::zap_log!(debug, $($t)*) };
}

macro_rules! log_info {
    ($($t:tt)*) => { $crate::internal::logging::zap_log!(info, $($t)*) };
}

macro_rules! log_warn {
    ($($t:tt)*) => { $crate::internal::logging::zap_log!(warn, $($t)*) };
}

macro_rules! log_error {
    ($($t:tt)*) => { $crate::internal::logging::zap_log!(error, $($t)*) };
}

pub(crate) use {log_debug, log_error, log_info, log_warn, zap_log};
