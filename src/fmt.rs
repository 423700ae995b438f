//! Logging shim
//!
//! Forwards to `defmt` on target and to `log` on host builds, so the
//! library logs the same way in both. Format strings must stay within the
//! common subset of the two (plain `{}` on primitives).

#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::trace!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::trace!($($arg)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::debug!($($arg)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::info!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::info!($($arg)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::warn!($($arg)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::error!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "embedded")))]
        ::log::error!($($arg)*);
        #[cfg(not(any(feature = "embedded", feature = "std")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}
