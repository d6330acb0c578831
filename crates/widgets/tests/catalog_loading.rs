//! Loading widget manifests from a theme directory.

use std::fs;
use std::path::Path;
use widgets::{
    BuildError, CatalogLoader as _, Composer, ComposerConfig, ManifestLoader, PageContext,
    RenderStrategy,
};

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn manifests_load_in_file_name_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let theme = tempfile::tempdir().unwrap();
    let dir = theme.path().join("widgets");
    fs::create_dir(&dir).unwrap();
    write(
        &dir,
        "card.widget.json",
        r#"{ "selector": ".card", "templateURL": "card.ejs",
             "styles": [{ "inline": true, "source": ".card{}" }],
             "scripts": [{ "sourceURL": "card.js" }] }"#,
    );
    write(&dir, "alert.widget.json", r#"{ "selector": "div.alert", "template": "<b>!</b>" }"#);
    write(&dir, "notes.txt", "not a widget");

    let catalog = ManifestLoader
        .load(&ComposerConfig::new(theme.path()))
        .unwrap();
    let names: Vec<_> = catalog.iter().map(|widget| widget.name()).collect();
    assert_eq!(names, ["alert", "card"]);

    let card = catalog.iter().nth(1).unwrap();
    assert_eq!(card.selector_text(), ".card");
    assert!(matches!(card.strategy(), RenderStrategy::TemplateFile(path) if path == Path::new("card.ejs")));
    assert_eq!(card.styles().len(), 1);
    assert_eq!(card.scripts()[0].file.as_deref(), Some(Path::new("card.js")));
}

#[test]
fn missing_widget_directory_gives_empty_catalog() {
    let theme = tempfile::tempdir().unwrap();
    let catalog = ManifestLoader
        .load(&ComposerConfig::new(theme.path()))
        .unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn invalid_manifests_are_configuration_errors() {
    let theme = tempfile::tempdir().unwrap();
    let dir = theme.path().join("widgets");
    fs::create_dir(&dir).unwrap();
    let config = ComposerConfig::new(theme.path());

    for manifest in [
        "{ not json",
        r#"{ "template": "<p></p>" }"#,
        r#"{ "selector": "" }"#,
        r#"{ "selector": "p", "template": "a", "templateURL": "b.ejs" }"#,
        r#"{ "selector": "p", "preRender": "fetch()" }"#,
    ] {
        write(&dir, "broken.widget.json", manifest);
        let result = ManifestLoader.load(&config);
        assert!(
            matches!(result, Err(BuildError::Configuration(_))),
            "accepted {manifest}"
        );
    }
}

#[tokio::test]
async fn loaded_catalog_drives_a_build() {
    let _ = env_logger::builder().is_test(true).try_init();
    let theme = tempfile::tempdir().unwrap();
    let dir = theme.path().join("widgets");
    fs::create_dir(&dir).unwrap();
    write(&dir, "clock.widget.json", r##"{ "selector": "#clock", "templateURL": "clock.ejs" }"##);
    write(&dir, "clock.ejs", "<time>noon</time>");

    let composer = Composer::from_loader(&ManifestLoader, ComposerConfig::new(theme.path())).unwrap();
    assert_eq!(composer.catalog().len(), 1);
    let out = composer
        .compose("<span id=\"clock\"></span>", &PageContext::default())
        .await
        .unwrap();
    assert!(out.contains("<body><time>noon</time></body>"), "{out}");
}
