//! End-to-end builds through `Composer`: matching, lifecycle ordering, failure
//! isolation and the final document.

use anyhow::anyhow;
use core::cell::Cell;
use core::time::Duration;
use serde_json::json;
use std::rc::Rc;
use widgets::{
    BuildError, Composer, ComposerConfig, DataRecord, HookFuture, PageContext, Phase, PreRender,
    WidgetCatalog, WidgetDefinition, WidgetScope, pre_render_fn, render_fn,
};

const GREET_PAGE: &str = "<html><body><div class=\"greet\"></div>\
    <div id=\"widgets-styles\"></div><div id=\"widgets-scripts\"></div></body></html>";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn composer(widgets: Vec<WidgetDefinition>) -> Composer {
    Composer::new(WidgetCatalog::new(widgets), ComposerConfig::default())
}

fn greet_widget() -> WidgetDefinition {
    WidgetDefinition::builder(".greet")
        .name("greet")
        .pre_render(pre_render_fn(|_scope, data| {
            data.insert("name".to_owned(), json!("World"));
            Ok(())
        }))
        .template("Hello <%= name %>")
        .build()
        .unwrap()
}

#[tokio::test]
async fn template_widget_replaces_element_and_anchors_are_removed() {
    init_logging();
    let out = composer(vec![greet_widget()])
        .compose(GREET_PAGE, &PageContext::default())
        .await
        .unwrap();
    assert_eq!(
        out,
        "<!DOCTYPE html><html><head></head><body>Hello World</body></html>"
    );
}

#[tokio::test]
async fn widgets_sharing_an_element_leave_one_outcome() {
    init_logging();
    let first = WidgetDefinition::builder(".shared")
        .name("first")
        .template("<p class=\"outcome\">first</p>")
        .build()
        .unwrap();
    let second = WidgetDefinition::builder(".shared")
        .name("second")
        .template("<p class=\"outcome\">second</p>")
        .build()
        .unwrap();
    let out = composer(vec![first, second])
        .compose(
            "<html><body><div class=\"shared\"></div></body></html>",
            &PageContext::default(),
        )
        .await
        .unwrap();

    let first_only = "<!DOCTYPE html><html><head></head><body><p class=\"outcome\">first</p></body></html>";
    let second_only = "<!DOCTYPE html><html><head></head><body><p class=\"outcome\">second</p></body></html>";
    assert!(
        out == first_only || out == second_only,
        "unexpected document: {out}"
    );
}

#[tokio::test]
async fn failing_widget_does_not_stop_the_others() {
    init_logging();
    let broken = WidgetDefinition::builder(".broken")
        .name("broken")
        .pre_render(pre_render_fn(|_scope, _data| Err(anyhow!("boom"))))
        .template("<p>never</p>")
        .build()
        .unwrap();
    let composer = composer(vec![broken, greet_widget()]);
    let document = composer
        .parse(
            "<html><body><div class=\"broken\"></div><div class=\"greet\"></div>\
             <div id=\"widgets-styles\"></div></body></html>",
        )
        .unwrap();

    let err = composer
        .compose_into(&document, &PageContext::default())
        .await
        .unwrap_err();
    assert!(
        matches!(
            &err,
            BuildError::Lifecycle { widget, phase: Phase::PreRender, .. } if widget == "broken"
        ),
        "{err:?}"
    );

    // The surviving widget finished and the anchors were still removed.
    assert_eq!(
        document.to_document_string().unwrap(),
        "<!DOCTYPE html><html><head></head><body><div class=\"broken\"></div>Hello World</body></html>"
    );
}

/// Suspends before filling the record so render would observe an empty record
/// if it were started early.
struct SlowCounter;

impl PreRender for SlowCounter {
    fn pre_render<'a>(
        &'a self,
        _scope: WidgetScope<'a>,
        data: &'a mut DataRecord,
    ) -> HookFuture<'a> {
        Box::pin(async move {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            data.insert("x".to_owned(), json!(1));
            Ok(())
        })
    }
}

#[tokio::test]
async fn pre_render_completes_before_render() {
    init_logging();
    let widget = WidgetDefinition::builder("span.value")
        .pre_render(SlowCounter)
        .render(render_fn(|scope, data| {
            let x = data
                .get("x")
                .ok_or_else(|| anyhow!("render started before pre_render finished"))?;
            scope
                .document
                .set_text_content(scope.element, &format!("x={x}"))
        }))
        .build()
        .unwrap();
    let out = composer(vec![widget])
        .compose(
            "<span class=\"value\"></span><span class=\"value\"></span>",
            &PageContext::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        out,
        "<!DOCTYPE html><html><head></head><body>\
         <span class=\"value\">x=1</span><span class=\"value\">x=1</span></body></html>"
    );
}

#[tokio::test]
async fn every_match_runs_exactly_once() {
    init_logging();
    let runs = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&runs);
    let widget = WidgetDefinition::builder("li")
        .pre_render(pre_render_fn(move |scope, data| {
            counter.set(counter.get() + 1);
            let label = scope.document.text_content(scope.element)?;
            data.insert("label".to_owned(), json!(label));
            Ok(())
        }))
        .template("<li>[<%= label %>]</li>")
        .build()
        .unwrap();
    let out = composer(vec![widget])
        .compose(
            "<ul><li>a</li><li>b</li><li>c</li></ul>",
            &PageContext::default(),
        )
        .await
        .unwrap();
    assert_eq!(runs.get(), 3);
    assert!(out.contains("<ul><li>[a]</li><li>[b]</li><li>[c]</li></ul>"), "{out}");
}

#[tokio::test]
async fn markup_produced_by_a_widget_is_not_matched_again() {
    init_logging();
    let runs = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&runs);
    let widget = WidgetDefinition::builder(".nest")
        .pre_render(pre_render_fn(move |_scope, _data| {
            counter.set(counter.get() + 1);
            Ok(())
        }))
        .template("<div class=\"nest\"><div class=\"nest\"></div></div>")
        .build()
        .unwrap();
    composer(vec![widget])
        .compose("<div class=\"nest\"></div>", &PageContext::default())
        .await
        .unwrap();
    assert_eq!(runs.get(), 1);
}

#[tokio::test]
async fn page_context_reaches_hooks() {
    init_logging();
    let widget = WidgetDefinition::builder("h1")
        .pre_render(pre_render_fn(|scope, data| {
            let title = scope.page.get("title").cloned().unwrap_or_default();
            data.insert("title".to_owned(), title);
            Ok(())
        }))
        .template("<h1><%= title %></h1>")
        .build()
        .unwrap();
    let page = PageContext::new(json!({ "title": "Fish & Chips" }));
    let out = composer(vec![widget])
        .compose("<h1>placeholder</h1>", &page)
        .await
        .unwrap();
    assert!(out.contains("<h1>Fish &amp; Chips</h1>"), "{out}");
}

#[tokio::test]
async fn passive_widget_leaves_element_untouched() {
    init_logging();
    let widget = WidgetDefinition::builder("#keep").build().unwrap();
    let out = composer(vec![widget])
        .compose("<p id=\"keep\">as is</p>", &PageContext::default())
        .await
        .unwrap();
    assert!(out.contains("<p id=\"keep\">as is</p>"));
}

#[tokio::test]
async fn template_errors_are_render_failures() {
    init_logging();
    let widget = WidgetDefinition::builder("p")
        .name("typo")
        .template("<%= missing %>")
        .build()
        .unwrap();
    let err = composer(vec![widget])
        .compose("<p></p>", &PageContext::default())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, BuildError::Lifecycle { widget, phase: Phase::Render, .. } if widget == "typo"),
        "{err:?}"
    );
}

#[tokio::test]
async fn empty_template_output_removes_the_element() {
    init_logging();
    let widget = WidgetDefinition::builder(".gone")
        .template("")
        .build()
        .unwrap();
    let out = composer(vec![widget])
        .compose("<p>a</p><p class=\"gone\">b</p><p>c</p>", &PageContext::default())
        .await
        .unwrap();
    assert_eq!(
        out,
        "<!DOCTYPE html><html><head></head><body><p>a</p><p>c</p></body></html>"
    );
}

struct Stalls;

impl PreRender for Stalls {
    fn pre_render<'a>(
        &'a self,
        _scope: WidgetScope<'a>,
        _data: &'a mut DataRecord,
    ) -> HookFuture<'a> {
        Box::pin(futures::future::pending())
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_unit_times_out_when_bounded() {
    init_logging();
    let stalled = WidgetDefinition::builder(".stalled")
        .name("stalled")
        .pre_render(Stalls)
        .template("<p>never</p>")
        .build()
        .unwrap();
    let config = ComposerConfig::default().with_unit_timeout(Some(Duration::from_millis(50)));
    let composer = Composer::new(WidgetCatalog::new(vec![stalled, greet_widget()]), config);
    let document = composer
        .parse("<div class=\"stalled\"></div><div class=\"greet\"></div>")
        .unwrap();

    let err = composer
        .compose_into(&document, &PageContext::default())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, BuildError::Timeout { widget, .. } if widget == "stalled"),
        "{err:?}"
    );
    assert!(document.to_document_string().unwrap().contains("Hello World"));
}

#[tokio::test]
async fn table_cell_widgets_keep_their_cells() {
    init_logging();
    let widget = WidgetDefinition::builder("td.cell")
        .template("<td>new</td>")
        .build()
        .unwrap();
    let out = composer(vec![widget])
        .compose(
            "<table><tbody><tr><td class=\"cell\">old</td></tr></tbody></table>",
            &PageContext::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        out,
        "<!DOCTYPE html><html><head></head><body>\
         <table><tbody><tr><td>new</td></tr></tbody></table></body></html>"
    );
}

#[tokio::test]
async fn unreadable_template_file_is_a_render_failure() {
    init_logging();
    let theme = tempfile::tempdir().unwrap();
    let absent = WidgetDefinition::builder(".absent")
        .name("absent")
        .template_url("absent.ejs")
        .build()
        .unwrap();
    let composer = Composer::new(
        WidgetCatalog::new(vec![absent, greet_widget()]),
        ComposerConfig::new(theme.path()),
    );
    let document = composer
        .parse("<div class=\"absent\"></div><div class=\"greet\"></div>")
        .unwrap();

    let err = composer
        .compose_into(&document, &PageContext::default())
        .await
        .unwrap_err();
    assert!(
        matches!(
            &err,
            BuildError::Lifecycle { widget, phase: Phase::Render, .. } if widget == "absent"
        ),
        "{err:?}"
    );
    assert_eq!(
        document.to_document_string().unwrap(),
        "<!DOCTYPE html><html><head></head><body><div class=\"absent\"></div>Hello World</body></html>"
    );
}
