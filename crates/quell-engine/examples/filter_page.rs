//! Example: filter emoji out of an HTML file
//!
//! Usage: `filter_page [FILE] [MODE]` where MODE is hide, desaturate, dim or blur.

use anyhow::Context;
use quell_engine::{DisplayMode, Engine, EngineConfig, ManualHost};

const SAMPLE: &str = "<h1>Launch day 🚀</h1><p>Thanks everyone 🙏🎉</p><code>:) 😀</code>";

fn main() -> anyhow::Result<()> {
    quell_engine::logging::init();

    let mut args = std::env::args().skip(1);
    let html = match args.next() {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?
        }
        None => SAMPLE.to_string(),
    };
    let mode = args
        .next()
        .map(|name| DisplayMode::from_name(&name))
        .unwrap_or_default();

    let mut engine = Engine::from_html(&html, "about:blank", ManualHost::new(), EngineConfig::default());
    engine.start(mode);
    engine.run_until_idle();

    let stats = engine.stats();
    tracing::info!("{} markers across {} processed nodes", stats.markers, stats.processed);

    let doc = engine.document();
    println!("{}", quell_engine::html::inner_html(doc.tree(), doc.body()));
    Ok(())
}
