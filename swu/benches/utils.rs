use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use tracing_tree::HierarchicalLayer;

pub fn register_tracing() {
    tracing_subscriber::registry()
        .with(
            HierarchicalLayer::new(2)
                .with_indent_amount(4)
                .with_ansi(false)
                // spans of this crate, plus every event emitted inside them
                .with_filter(tracing_subscriber::filter::FilterFn::new(|metadata| {
                    metadata.target().contains("swu") || metadata.is_event()
                })),
        )
        .init();
}

#[macro_export]
macro_rules! timeit {
    ($label:expr, $block:block) => {{
        use std::time::Instant;
        let start = Instant::now();
        let result = $block;
        let duration = start.elapsed();
        println!("Time elapsed in {}: {:?}", $label, duration);
        result
    }};
}
