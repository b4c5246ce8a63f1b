//! Edge case tests for quell-engine
//!
//! Races with the page, odd text, and lifecycle corners.

use std::time::Duration;

use quell_engine::dom::{Document, NodeId};
use quell_engine::processor::{SkipReason, TextOutcome};
use quell_engine::{
    DisplayMode, Engine, EngineConfig, ManualHost, NodeProcessor, VisitationPolicy,
};

const MARKER: &str = "quell-emoji";

fn engine(html: &str) -> Engine<ManualHost> {
    Engine::from_html(html, "https://example.org/", ManualHost::new(), EngineConfig::default())
}

fn scheduled(html: &str) -> Engine<ManualHost> {
    let config = EngineConfig {
        sync_pass_limit: 0,
        ..EngineConfig::default()
    };
    Engine::from_html(html, "https://example.org/", ManualHost::new(), config)
}

fn marker_count(engine: &Engine<ManualHost>) -> usize {
    engine.stats().markers
}

fn first_text(engine: &Engine<ManualHost>, id: &str) -> NodeId {
    let doc = engine.document();
    let elem = doc.get_element_by_id(id).unwrap();
    doc.tree().children(elem).next().unwrap()
}

#[test]
fn test_length_threshold() {
    let mut processor = NodeProcessor::new(VisitationPolicy::new(MARKER), 10);
    let mut doc = Document::new("about:blank");
    let body = doc.body();
    let tree = doc.tree_mut();

    let at_limit = tree.create_text("123456789😀");
    let over = tree.create_text("1234567890😀");
    tree.append_child(body, at_limit).unwrap();
    tree.append_child(body, over).unwrap();

    assert_eq!(
        processor.process_text(tree, at_limit, DisplayMode::Hide).unwrap(),
        TextOutcome::Wrapped(1)
    );
    assert_eq!(
        processor.process_text(tree, over, DisplayMode::Hide).unwrap(),
        TextOutcome::Skipped(SkipReason::TooLong)
    );
}

#[test]
fn test_zwj_sequence_round_trip() {
    let family = "family: 👨\u{200D}👩\u{200D}👧 done";
    let mut engine = engine(&format!("<p>{family}</p>"));
    engine.start(DisplayMode::Hide);
    assert_eq!(marker_count(&engine), 5);
    engine.stop();
    let doc = engine.document();
    assert_eq!(doc.tree().text_content(doc.body()), family);
}

#[test]
fn test_keycap_and_variation_selector() {
    let text = "press 1\u{FE0F}\u{20E3} then \u{2764}\u{FE0F}";
    let mut engine = engine(&format!("<p>{text}</p>"));
    engine.start(DisplayMode::Dim);
    // FE0F, 20E3, 2764, FE0F; the digit stays plain
    assert_eq!(marker_count(&engine), 4);
    engine.stop();
    let doc = engine.document();
    assert_eq!(doc.tree().text_content(doc.body()), text);
}

#[test]
fn test_text_released_before_its_slot() {
    let mut engine = scheduled("<p id=\"a\">one 😀</p><p id=\"b\">two 🎉</p>");
    engine.start(DisplayMode::Hide);
    let doomed = first_text(&engine, "a");

    engine.document_mut().tree_mut().release(doomed).unwrap();
    engine.host_mut().take_slot();
    let report = engine.run_slot();
    assert_eq!(report.processed, 2);
    assert_eq!(report.markers, 1);
    assert_eq!(marker_count(&engine), 1);
}

#[test]
fn test_text_moved_into_code_before_its_slot() {
    let mut engine = scheduled("<p id=\"a\">moved 😀</p><code id=\"c\"></code>");
    engine.start(DisplayMode::Hide);
    let text = first_text(&engine, "a");
    let code = engine.document().get_element_by_id("c").unwrap();

    engine.document_mut().tree_mut().append_child(code, text).unwrap();
    engine.run_until_idle();
    assert_eq!(marker_count(&engine), 0);
    assert!(engine.processor().is_processed(text));
}

#[test]
fn test_stop_mid_pass() {
    let config = EngineConfig {
        sync_pass_limit: 0,
        batch_size: 2,
        ..EngineConfig::default()
    };
    let html: String = (0..6).map(|i| format!("<p>{i} 😀</p>")).collect();
    let mut engine = Engine::from_html(&html, "https://example.org/", ManualHost::new(), config);
    engine.start(DisplayMode::Hide);
    engine.host_mut().take_slot();
    engine.run_slot();
    assert_eq!(marker_count(&engine), 2);

    assert_eq!(engine.stop(), 2);
    assert!(!engine.is_holding());
    assert!(engine.scheduler().is_idle());

    // the slot requested before the stop fires into an empty queue
    assert!(engine.host_mut().take_slot().is_some());
    let report = engine.run_slot();
    assert_eq!(report.processed, 0);
    assert_eq!(marker_count(&engine), 0);
}

#[test]
fn test_restart_after_stop() {
    let mut engine = engine("<p>again 🔁</p>");
    assert_eq!(engine.start(DisplayMode::Hide), 1);
    assert_eq!(engine.stop(), 1);
    assert_eq!(engine.start(DisplayMode::Blur), 1);
    assert_eq!(marker_count(&engine), 1);
}

#[test]
fn test_start_twice_does_not_double_wrap() {
    let mut engine = engine("<p>twice ✨</p>");
    engine.start(DisplayMode::Hide);
    assert_eq!(engine.start(DisplayMode::Dim), 0);
    assert_eq!(marker_count(&engine), 1);
    assert_eq!(engine.mode(), DisplayMode::Dim);
}

#[test]
fn test_preexisting_marker_class_untouched() {
    let mut engine = engine("<span class=\"quell-emoji\">🙂🙂</span><p>x 🙂</p>");
    engine.start(DisplayMode::Hide);
    // the page's own span counts as a marker but is never split
    assert_eq!(marker_count(&engine), 2);
    let doc = engine.document();
    let span = doc.tree().elements_by_tag(doc.body(), "span")[0];
    assert_eq!(doc.tree().children(span).count(), 1);
}

#[test]
fn test_editable_region_pruned_with_its_islands() {
    let mut engine = engine(
        "<div contenteditable><span id=\"island\" contenteditable=\"false\">card 🃏</span> typing 😀</div>",
    );
    engine.start(DisplayMode::Hide);
    assert_eq!(marker_count(&engine), 0);

    // content added later straight into the island is judged by its own parent
    let island = engine.document().get_element_by_id("island").unwrap();
    let tree = engine.document_mut().tree_mut();
    let text = tree.create_text(" new 🃏");
    tree.append_child(island, text).unwrap();
    engine.run_until_idle();
    assert_eq!(marker_count(&engine), 1);
}

#[test]
fn test_comments_and_whitespace_ignored() {
    let mut engine = engine("<div><!-- 😀 -->   \n  <p>\t</p></div>");
    assert_eq!(engine.start(DisplayMode::Hide), 0);
}

#[test]
fn test_document_without_body() {
    let mut engine = Engine::new(
        Document::empty("about:blank"),
        ManualHost::new(),
        EngineConfig::default(),
    );
    let tree = engine.document_mut().tree_mut();
    let root = tree.root();
    let div = tree.create_element("div");
    let text = tree.create_text("loose 😀");
    tree.append_child(root, div).unwrap();
    tree.append_child(div, text).unwrap();

    assert_eq!(engine.start(DisplayMode::Hide), 1);
    assert!(!engine.is_holding());
}

#[test]
fn test_sweep_drops_stale_handles() {
    let config = EngineConfig {
        sync_pass_limit: 0,
        sweep_threshold: 0,
        ..EngineConfig::default()
    };
    let html: String = (0..5).map(|i| format!("<p>{i} 😀</p>")).collect();
    let mut engine = Engine::from_html(&html, "https://example.org/", ManualHost::new(), config);
    engine.start(DisplayMode::Hide);
    engine.run_until_idle();

    // replaced text nodes were released; only live handles remain
    let tree = engine.document().tree();
    assert_eq!(engine.stats().processed, 5);
    assert!(engine.processor().processed().len() <= tree.len());
    assert_eq!(marker_count(&engine), 5);
}

#[test]
fn test_message_appended_to_processed_item_then_moved() {
    let mut engine = engine("<ul id=\"chats\"><li id=\"old\">old</li></ul>");
    engine.start(DisplayMode::Hide);
    let chats = engine.document().get_element_by_id("chats").unwrap();
    let old = engine.document().get_element_by_id("old").unwrap();

    let tree = engine.document_mut().tree_mut();
    let item = tree.create_element("li");
    let text = tree.create_text("hi 😀");
    tree.append_child(item, text).unwrap();
    tree.append_child(chats, item).unwrap();
    engine.run_until_idle();
    assert_eq!(marker_count(&engine), 1);
    assert!(engine.processor().is_processed(item));

    // a new message lands in the item, then the item jumps to the top
    let tree = engine.document_mut().tree_mut();
    let message = tree.create_text(" new 🎉");
    tree.append_child(item, message).unwrap();
    tree.insert_before(chats, item, Some(old)).unwrap();
    engine.run_until_idle();

    assert_eq!(marker_count(&engine), 2);
    let doc = engine.document();
    assert_eq!(doc.tree().text_content(item), "hi 😀 new 🎉");
}

#[test]
fn test_deeply_nested_page() {
    let depth = 5_000;
    let html = format!("{}bottom 😀{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let mut engine = engine(&html);
    assert_eq!(engine.start(DisplayMode::Hide), 1);
    assert_eq!(engine.stop(), 1);
    let doc = engine.document();
    assert_eq!(doc.tree().text_content(doc.body()), "bottom 😀");
}

#[test]
fn test_next_deadline_tracks_debounce() {
    let mut engine = engine("<main id=\"m\"></main>");
    engine.start(DisplayMode::Hide);
    assert_eq!(engine.next_deadline(), None);

    let main = engine.document().get_element_by_id("m").unwrap();
    let tree = engine.document_mut().tree_mut();
    let text = tree.create_text("late 😀");
    tree.append_child(main, text).unwrap();
    engine.tick();
    assert_eq!(engine.next_deadline(), Some(Duration::from_millis(100)));
    engine.host_mut().advance(Duration::from_millis(30));
    assert_eq!(engine.next_deadline(), Some(Duration::from_millis(70)));
}
