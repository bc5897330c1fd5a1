//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "emissions_classifier=info,process_data=info,train_classifier=info,predict_tax_band=info";

/// Install a registry with an `EnvFilter` and a stderr `fmt` layer.
///
/// Calling it twice is harmless; the second call leaves the first subscriber in place.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
