//! Print the highlight spans of an AScript file.
//!
//! ```text
//! RUST_LOG=debug cargo run -p scribe-ascript --example highlight_file -- path/to/file.as
//! ```

use scribe_ascript::AScriptFrontEnd;
use scribe_core::{Document, HighlightPipeline, PipelineConfig, PipelineState};
use scribe_lang::FrontEndRegistry;
use std::sync::Arc;

const SAMPLE: &str = r#"func add(a: number, b: number) {
    return a + b;
}

proc main() {
    var total = add(1, 2);
    if total > 2 { print "big"; } else { print "small"; }
}
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let document = match std::env::args().nth(1) {
        Some(path) => Document::open(path)?,
        None => {
            let mut document = Document::from_text(SAMPLE);
            document.set_path("sample.as");
            document
        }
    };

    let mut registry = FrontEndRegistry::new();
    AScriptFrontEnd::register(&mut registry)?;
    let pipeline = HighlightPipeline::synchronous(Arc::new(registry), PipelineConfig::default());
    pipeline.run_now(document.snapshot());

    if pipeline.state() == PipelineState::Failed {
        eprintln!("{}", pipeline.last_error().unwrap_or_default());
        return Ok(());
    }

    let rope = document.rope();
    for span in pipeline.highlight_range(0, rope.len()) {
        let position = rope.position_of(span.span.start)?.to_string();
        let text = rope.text_in(span.span.start, span.span.end)?;
        println!("{position:>6}  {:<16} {text}", span.scope);
    }
    Ok(())
}
