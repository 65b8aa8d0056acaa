//! Pipeline concurrency tests
//!
//! 1. The worker publishes the result of a trigger.
//! 2. Triggers arriving within the debounce window collapse into one pass.
//! 3. A pass that finishes after a newer one never overwrites the newer result.
//! 4. A failing pass keeps the previously published highlighter.

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use scribe_core::{Document, HighlightPipeline, PipelineConfig, PipelineState, Snapshot};
use scribe_lang::{
    FrontEndRegistry, HighlightCategory, HighlightToken, Language, LanguageFrontEnd, Span,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
#[error("unexpected `!` at {0}")]
struct Bang(usize);

/// Highlights every word as a symbol.
///
/// Text starting with `slow` blocks in `tokenize` until released, text containing `!` fails to
/// parse.
#[derive(Default)]
struct Words {
    passes: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

struct Gate {
    started: Sender<()>,
    release: Mutex<Receiver<()>>,
}

impl LanguageFrontEnd for Words {
    type Token = (Span, String);
    type Ast = Vec<(Span, String)>;
    type Error = Bang;

    fn language(&self) -> Language {
        Language {
            name: "words",
            file_extensions: &["w"],
        }
    }

    fn tokenize(&self, text: &str) -> Vec<(Span, String)> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        if text.starts_with("slow") {
            if let Some(gate) = &self.gate {
                gate.started.send(()).unwrap();
                gate.release.lock().recv().unwrap();
            }
        }

        let mut tokens = Vec::new();
        let mut start = None;
        for (i, ch) in text.chars().chain(std::iter::once(' ')).enumerate() {
            match (ch.is_whitespace(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    let word: String = text.chars().skip(s).take(i - s).collect();
                    tokens.push((Span::new(s, i), word));
                    start = None;
                }
                _ => {}
            }
        }
        tokens
    }

    fn build_ast(&self, tokens: &[(Span, String)]) -> Result<Self::Ast, Bang> {
        match tokens.iter().find(|(_, word)| word.contains('!')) {
            Some((span, _)) => Err(Bang(span.start)),
            None => Ok(tokens.to_vec()),
        }
    }

    fn build_highlighting(&self, ast: &Self::Ast, _: &[(Span, String)]) -> Vec<HighlightToken> {
        ast.iter()
            .map(|(span, word)| {
                HighlightToken::new(*span, HighlightCategory::SymbolName(word.clone()))
            })
            .collect()
    }
}

fn snapshot(text: &str) -> Snapshot {
    let mut doc = Document::from_text(text);
    doc.set_path("sample.w");
    doc.snapshot()
}

#[test]
fn test_worker_publishes() {
    let registry = Arc::new(FrontEndRegistry::new().with(Words::default()));
    let config = PipelineConfig::new().with_debounce(Duration::from_millis(5));
    let pipeline = HighlightPipeline::new(registry, config).unwrap();

    let version = pipeline.trigger(snapshot("alpha beta gamma")).unwrap();
    assert!(pipeline.wait_for(version, TIMEOUT));

    assert_eq!(pipeline.state(), PipelineState::Ready);
    let spans = pipeline.highlight_range(6, 7);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].category, HighlightCategory::SymbolName("beta".into()));
    assert_eq!(spans[0].scope, "symbol");
}

#[test]
fn test_debounce_collapses_bursts() {
    let passes = Arc::new(AtomicUsize::new(0));
    let words = Words {
        passes: passes.clone(),
        gate: None,
    };
    let registry = Arc::new(FrontEndRegistry::new().with(words));
    let config = PipelineConfig::new().with_debounce(Duration::from_millis(200));
    let pipeline = HighlightPipeline::new(registry, config).unwrap();

    let mut doc = Document::from_text("");
    doc.set_path("burst.w");
    for ch in ["a", "b", "c", "d", "e"] {
        doc.insert(doc.rope().len(), ch).unwrap();
        pipeline.trigger(doc.snapshot());
    }

    assert!(pipeline.wait_idle(TIMEOUT));
    assert_eq!(pipeline.published_version(), pipeline.latest_version());
    assert!(passes.load(Ordering::SeqCst) <= 2);

    let highlighter = pipeline.current().unwrap();
    assert_eq!(
        highlighter.tokens()[0].category,
        HighlightCategory::SymbolName("abcde".into())
    );
}

#[test]
fn test_late_result_does_not_overwrite_newer() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let words = Words {
        passes: Arc::default(),
        gate: Some(Gate {
            started: started_tx,
            release: Mutex::new(release_rx),
        }),
    };
    let registry = Arc::new(FrontEndRegistry::new().with(words));
    let pipeline = HighlightPipeline::synchronous(registry, PipelineConfig::default());

    thread::scope(|scope| {
        // Run A: triggered first, finishes last.
        let a = scope.spawn(|| pipeline.run_now(snapshot("slow old text")));
        started_rx.recv_timeout(TIMEOUT).unwrap();

        // Run B: triggered second, finishes first.
        assert!(pipeline.run_now(snapshot("fresh")));
        let published = pipeline.published_version();

        release_tx.send(()).unwrap();
        assert!(!a.join().unwrap());

        assert_eq!(pipeline.published_version(), published);
    });

    let highlighter = pipeline.current().unwrap();
    assert_eq!(highlighter.len(), 1);
    assert_eq!(
        highlighter.tokens()[0].category,
        HighlightCategory::SymbolName("fresh".into())
    );
    assert_eq!(pipeline.state(), PipelineState::Ready);
}

#[test]
fn test_failure_keeps_previous_highlighter() {
    let registry = Arc::new(FrontEndRegistry::new().with(Words::default()));
    let pipeline = HighlightPipeline::synchronous(registry, PipelineConfig::default());

    assert!(pipeline.run_now(snapshot("good words")));
    let before = pipeline.current().unwrap();

    assert!(!pipeline.run_now(snapshot("bad words!")));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(
        pipeline.last_error().as_deref(),
        Some("parsing failed: unexpected `!` at 4")
    );
    assert!(Arc::ptr_eq(&before, &pipeline.current().unwrap()));

    // The next good pass recovers.
    assert!(pipeline.run_now(snapshot("good again")));
    assert_eq!(pipeline.state(), PipelineState::Ready);
}

#[test]
fn test_unsupported_extension_publishes_nothing() {
    let registry = Arc::new(FrontEndRegistry::new().with(Words::default()));
    let pipeline = HighlightPipeline::synchronous(registry, PipelineConfig::default());

    let mut doc = Document::from_text("some words");
    doc.set_path("notes.txt");
    pipeline.trigger(doc.snapshot());

    assert!(pipeline.current().is_none());
    assert!(pipeline.highlight_range(0, 10).is_empty());
    assert_eq!(pipeline.state(), PipelineState::Idle);
}
