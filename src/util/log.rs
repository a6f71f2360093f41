use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use std::time::Instant;

/// Last emission time per call site, keyed by `file:line`.
pub static LAST_LOG: LazyLock<Mutex<HashMap<String, Instant>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns true at most once every `seconds` for the given call site.
pub fn should_log(location: String, seconds: u64) -> bool {
    let Ok(mut last_log) = LAST_LOG.lock() else {
        // A poisoned map only loses rate limiting.
        return true;
    };
    if last_log
        .get(&location)
        .map_or(true, |then| then.elapsed().as_secs() >= seconds)
    {
        last_log.insert(location, Instant::now());
        true
    } else {
        false
    }
}

/// Like [`tracing::warn!`], but emits at most once every `$seconds` per call site.
///
/// Degenerate geometry tends to recur every frame; this keeps the log readable.
#[macro_export]
macro_rules! warn_every_seconds {
    ($seconds:expr, $($args:expr),+) => {
        if $crate::util::log::should_log($crate::util::assert::current_location!(), $seconds) {
            $crate::core::prelude::warn!($($args),+);
        }
    }
}

#[macro_export]
macro_rules! error_every_seconds {
    ($seconds:expr, $($args:expr),+) => {
        if $crate::util::log::should_log($crate::util::assert::current_location!(), $seconds) {
            $crate::core::prelude::error!($($args),+);
        }
    }
}
