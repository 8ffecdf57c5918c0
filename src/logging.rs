use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the tracing subscriber for an embedding shell or a test binary.
///
/// Honours `RUST_LOG`; defaults to `liste_achats=info`. Safe to call more
/// than once: later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("liste_achats=info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
