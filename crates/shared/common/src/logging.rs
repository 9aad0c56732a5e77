//! Tracing subscriber setup shared by every binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(env: Environment) -> &'static str {
    match env {
        Environment::Local | Environment::Dev => "debug,h2=info,hyper=info,tower=info",
        Environment::Prod => "info",
    }
}

/// Install the global subscriber.
///
/// `local` prints human readable lines, `dev` and `prod` emit JSON.
pub fn init(env: Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(env).into());

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        Environment::Local => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
        Environment::Dev | Environment::Prod => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
    }
}
