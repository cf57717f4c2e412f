// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

// Forward to `tracing` when the feature is on. Firmware builds have no logger and
// only type-check the format arguments.

macro_rules! debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)+);
        #[cfg(not(feature = "tracing"))]
        let _ = format_args!($($arg)+);
    }};
}

macro_rules! info {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        tracing::info!($($arg)+);
        #[cfg(not(feature = "tracing"))]
        let _ = format_args!($($arg)+);
    }};
}

macro_rules! warn {
    ($($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)+);
        #[cfg(not(feature = "tracing"))]
        let _ = format_args!($($arg)+);
    }};
}
