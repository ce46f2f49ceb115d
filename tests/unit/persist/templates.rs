use super::*;
use crate::foundation::core::GridDimensions;
use crate::persist::codec::save_frame;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("unit_templates")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn pose() -> Frame {
    Frame::new(GridDimensions::new(10, 10).unwrap(), 0).with_cell(4, 4, 1)
}

#[test]
fn lists_json_files_sorted() {
    let dir = fixture_dir("list");
    save_frame(&pose(), &dir.join("walk_2.json")).unwrap();
    save_frame(&pose(), &dir.join("Stand.json")).unwrap();
    save_frame(&pose(), &dir.join("walk_1.json")).unwrap();
    std::fs::write(dir.join("notes.txt"), "ignore me").unwrap();
    std::fs::create_dir_all(dir.join("nested.json")).unwrap();

    let templates = TemplateDir::open(&dir).unwrap();
    assert_eq!(
        templates.list().unwrap(),
        vec!["Stand.json", "walk_1.json", "walk_2.json"]
    );
}

#[test]
fn loads_by_name_with_or_without_extension() {
    let dir = fixture_dir("load");
    save_frame(&pose(), &dir.join("stand.json")).unwrap();
    let templates = TemplateDir::open(&dir).unwrap();

    assert_eq!(templates.load("stand.json").unwrap(), pose());
    assert_eq!(templates.load("stand").unwrap(), pose());
    assert!(matches!(
        templates.load("jump"),
        Err(StickgridError::NotFound(_))
    ));
}

#[test]
fn names_cannot_escape_the_directory() {
    let dir = fixture_dir("escape");
    let templates = TemplateDir::open(&dir).unwrap();
    assert!(matches!(
        templates.load("../escape/x.json"),
        Err(StickgridError::InvalidArgument(_))
    ));
    assert!(matches!(
        templates.load("/etc/passwd"),
        Err(StickgridError::InvalidArgument(_))
    ));
}

#[test]
fn normalizes_separators() {
    assert_eq!(normalize_template_name("a\\b/./c.json").unwrap(), "a/b/c.json");
    assert!(normalize_template_name("./").is_err());
}

#[test]
fn open_requires_an_existing_directory() {
    let dir = fixture_dir("open");
    assert!(matches!(
        TemplateDir::open(dir.join("missing")),
        Err(StickgridError::NotFound(_))
    ));
    let file = dir.join("file.json");
    std::fs::write(&file, "{}").unwrap();
    assert!(matches!(
        TemplateDir::open(&file),
        Err(StickgridError::InvalidArgument(_))
    ));
}
