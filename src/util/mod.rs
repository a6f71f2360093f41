use anyhow::Result;
use std::path::Path;
use tracing_subscriber::fmt::time::OffsetTime;

pub mod assert;
pub mod colour;
pub mod coords;
pub mod linalg;
pub mod log;
pub mod range;

pub mod gg_float {
    use crate::core::config::ROUNDING_SCALE;
    use num_traits::Zero;

    pub fn force_positive_zero(x: f32) -> f32 {
        if x.is_zero() { 0.0 } else { x }
    }

    /// Rounds to 7 decimal places. Rotated vertices go through this so that repeated
    /// pixel/NDC round trips do not accumulate drift.
    pub fn round_fixed(x: f64) -> f64 {
        (x * ROUNDING_SCALE).round() / ROUNDING_SCALE
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(x: f64) -> f32 {
        x as f32
    }
}

pub mod gg_iter {
    use crate::util::linalg::Vec2;

    /// Arithmetic mean of the vectors, or `None` if there are none.
    pub fn mean(values: impl IntoIterator<Item = Vec2>) -> Option<Vec2> {
        let (sum, count) = values
            .into_iter()
            .fold((Vec2::zero(), 0_u32), |(sum, count), v| (sum + v, count + 1));
        #[allow(clippy::cast_precision_loss)]
        (count > 0).then(|| sum / count as f32)
    }

    pub fn sum_tuple3<T: std::ops::Add<Output = T>>(acc: (T, T, T), x: (T, T, T)) -> (T, T, T) {
        (acc.0 + x.0, acc.1 + x.1, acc.2 + x.2)
    }
}

/// Installs the global `tracing` subscriber.
///
/// With a path, events go to that file (truncated first); otherwise to stderr. Fails if a
/// subscriber is already installed or the file cannot be opened.
pub fn setup_log(logfile: Option<&Path>) -> Result<()> {
    let timer = OffsetTime::new(
        time::UtcOffset::UTC,
        time::macros::format_description!("[hour]:[minute]:[second].[subsecond digits:6]"),
    );
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .with_source_location(true)
        .with_timer(timer);
    let builder = tracing_subscriber::fmt().event_format(format);
    match logfile {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(path)?;
            builder
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}
