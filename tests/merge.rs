use std::fs;
use std::path::Path;

use junit_report_merger::runner::run_merge;
use junit_report_merger::xml::{self, Element};
use pretty_assertions::assert_eq;

fn write_input(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("failed to write input file");
}

fn read_output(path: &Path) -> Element {
    let bytes = fs::read(path).expect("failed to read output file");
    xml::parse_document(&bytes[..]).expect("output is not well-formed XML")
}

fn find_suite<'a>(node: &'a Element, name: &str) -> &'a Element {
    fn walk<'a>(node: &'a Element, name: &str) -> Option<&'a Element> {
        if node.tag == "testsuite" && node.attr("name") == Some(name) {
            return Some(node);
        }
        node.children.iter().find_map(|child| walk(child, name))
    }
    walk(node, name).unwrap_or_else(|| panic!("no suite named {:?}", name))
}

#[test]
fn test_merges_reports_across_files_and_skips_bad_input() {
    let input = tempfile::tempdir().expect("failed to create temp directory");
    write_input(
        input.path(),
        "a.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="Foo" tests="1" failures="0" time="0.5">
    <testcase class="ClassA" name="test_one" time="0.5" assertions="2"/>
  </testsuite>
</testsuites>
"#,
    );
    fs::create_dir_all(input.path().join("shard-2")).unwrap();
    write_input(
        &input.path().join("shard-2"),
        "b.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="Foo" tests="1" failures="1" time="0.25">
    <testcase class="ClassA" name="test_two" time="0.25" assertions="1">
      <failure message="assertion failed">trace</failure>
    </testcase>
  </testsuite>
</testsuites>
"#,
    );
    write_input(input.path(), "notes.txt", "this is not an xml report");

    let out_dir = tempfile::tempdir().expect("failed to create temp directory");
    let output = out_dir.path().join("merged.xml");
    run_merge(input.path(), &output).expect("merge run failed");

    let document = read_output(&output);
    assert_eq!(document.tag, "testsuites");
    assert_eq!(document.children.len(), 1);

    let foo = find_suite(&document, "Foo");
    assert_eq!(foo.attr("tests"), Some("2"));
    assert_eq!(foo.attr("failures"), Some("1"));
    assert_eq!(foo.attr("assertions"), Some("3"));
    assert_eq!(foo.attr("time"), Some("0.75"));

    let cases: Vec<&Element> = foo.children.iter().filter(|c| c.tag == "testcase").collect();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].attr("name"), Some("test_one"));
    assert!(cases[0].children.is_empty());
    assert_eq!(cases[1].attr("name"), Some("test_two"));
    assert_eq!(cases[1].children.len(), 1);
    assert_eq!(cases[1].children[0].tag, "failure");
    // Status markers are bare elements; message and text are not report
    // content the merge retains.
    assert!(cases[1].children[0].attributes.is_empty());
}

#[test]
fn test_pass_from_later_shard_supersedes_recorded_failure() {
    let input = tempfile::tempdir().expect("failed to create temp directory");
    write_input(
        input.path(),
        "a.xml",
        r#"<testsuites>
  <testsuite name="Foo">
    <testcase class="ClassA" name="test_flaky" time="1.5">
      <failure message="boom"/>
    </testcase>
  </testsuite>
</testsuites>
"#,
    );
    write_input(
        input.path(),
        "b.xml",
        r#"<testsuites>
  <testsuite name="Foo">
    <testcase class="ClassA" name="test_flaky" time="1.25"/>
  </testsuite>
</testsuites>
"#,
    );

    let out_dir = tempfile::tempdir().expect("failed to create temp directory");
    let output = out_dir.path().join("merged.xml");
    run_merge(input.path(), &output).expect("merge run failed");

    let document = read_output(&output);
    let foo = find_suite(&document, "Foo");
    assert_eq!(foo.attr("tests"), Some("1"));
    assert_eq!(foo.attr("failures"), Some("0"));

    let cases: Vec<&Element> = foo.children.iter().filter(|c| c.tag == "testcase").collect();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].attr("time"), Some("1.25"));
    assert!(cases[0].children.is_empty());
}

#[test]
fn test_unnamed_wrapper_suites_are_flattened() {
    let input = tempfile::tempdir().expect("failed to create temp directory");
    write_input(
        input.path(),
        "wrapped.xml",
        r#"<testsuites>
  <testsuite>
    <testsuite name="Inner">
      <testcase class="ClassA" name="test_one" time="0.5"/>
    </testsuite>
  </testsuite>
</testsuites>
"#,
    );

    let out_dir = tempfile::tempdir().expect("failed to create temp directory");
    let output = out_dir.path().join("merged.xml");
    run_merge(input.path(), &output).expect("merge run failed");

    let document = read_output(&output);
    assert_eq!(document.children.len(), 1);
    assert_eq!(document.children[0].attr("name"), Some("Inner"));
    assert_eq!(document.children[0].attr("tests"), Some("1"));
}

#[test]
fn test_empty_input_yields_minimal_document_and_creates_output_dir() {
    let input = tempfile::tempdir().expect("failed to create temp directory");
    let out_dir = tempfile::tempdir().expect("failed to create temp directory");
    let output = out_dir.path().join("reports/final/merged.xml");

    run_merge(input.path(), &output).expect("merge run failed");

    let text = fs::read_to_string(&output).expect("failed to read output file");
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

    let document = read_output(&output);
    assert_eq!(document.tag, "testsuites");
    assert!(document.children.is_empty());
    assert!(document.attributes.is_empty());
}

#[test]
fn test_output_is_pretty_printed() {
    let input = tempfile::tempdir().expect("failed to create temp directory");
    write_input(
        input.path(),
        "a.xml",
        r#"<testsuites><testsuite name="Foo"><testcase class="ClassA" name="test_one" time="0.5"/></testsuite></testsuites>"#,
    );

    let out_dir = tempfile::tempdir().expect("failed to create temp directory");
    let output = out_dir.path().join("merged.xml");
    run_merge(input.path(), &output).expect("merge run failed");

    let text = fs::read_to_string(&output).expect("failed to read output file");
    assert!(text.contains("\n  <testsuite "));
    assert!(text.contains("\n    <testcase "));
    assert!(text.ends_with("</testsuites>\n"));
}
