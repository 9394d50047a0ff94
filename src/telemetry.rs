use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::AppEnvironment;

/// Installs the global subscriber: JSON lines in production, human-readable otherwise.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(env: &AppEnvironment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info"));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match env {
        AppEnvironment::Production => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already set: {}", e);
    }
}
