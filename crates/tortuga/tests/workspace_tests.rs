//! Workspace, property-list, and stream tests driven through the public
//! API, mirroring how an interactive session exercises them.

use tortuga::{Interpreter, ScriptHost};

fn run(source: &str) -> String {
    let host = ScriptHost::new("");
    let output = host.output_handle();
    let mut interp = Interpreter::new(Box::new(host));
    interp.execute_text(source);
    output.text()
}

// ---------------------------------------------------------------------------
// variables
// ---------------------------------------------------------------------------

#[test]
fn make_and_thing_round_trip() {
    assert_eq!(run("make \"x 5\nprint thing \"x\nprint :x"), "5\n5\n");
}

#[test]
fn unbound_variable_reports_no_value() {
    let output = run("print :nowhere");
    assert!(
        output.contains("nowhere has no value"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn namep_distinguishes_bound_names() {
    assert_eq!(run("make \"x 1\nprint namep \"x\nprint namep \"y"), "true\nfalse\n");
}

#[test]
fn global_declares_at_the_bottom() {
    let source = "to f\nglobal \"g\nmake \"g 3\nend\nf\nprint :g";
    assert_eq!(run(source), "f defined\n3\n");
}

#[test]
fn erase_name_removes_the_binding() {
    assert_eq!(run("make \"x 1\nern \"x\nprint namep \"x"), "false\n");
    assert_eq!(
        run("make \"x 1\nerase [[] [x]]\nprint namep \"x"),
        "false\n"
    );
}

#[test]
fn erall_skips_buried_names() {
    let source = "make \"keep 1\nmake \"drop 2\nbury [[] [keep]]\nerall\nprint namep \"keep\nprint namep \"drop";
    assert_eq!(run(source), "true\nfalse\n");
}

// ---------------------------------------------------------------------------
// procedure introspection
// ---------------------------------------------------------------------------

#[test]
fn arity_reports_the_triple() {
    let source = "to f :a :b [:c 1]\nend\nprint arity \"f\nprint arity \"print";
    assert_eq!(run(source), "f defined\n2 2 3\n0 1 -1\n");
}

#[test]
fn text_reconstructs_the_definition() {
    let source = "to f :x\noutput :x\nend\nshow text \"f";
    assert_eq!(run(source), "f defined\n[[x] [output :x]]\n");
}

#[test]
fn fulltext_replays_the_source() {
    let source = "to f :x\noutput :x\nend\nprint fulltext \"f";
    assert_eq!(run(source), "f defined\nto f :x output :x end\n");
}

#[test]
fn printout_prints_whole_definitions() {
    let source = "to f :x\noutput :x\nend\npo \"f";
    let output = run(source);
    assert!(output.contains("to f :x"), "{output:?}");
    assert!(output.contains("output :x"), "{output:?}");
    assert!(output.contains("end"), "{output:?}");
}

#[test]
fn pot_prints_titles_only() {
    let source = "to f :x [:y 2]\noutput :x\nend\npot \"f";
    assert_eq!(run(source), "f defined\nto f :x [:y 2]\n");
}

#[test]
fn copydef_aliases_both_kinds() {
    let source = "copydef \"say \"print\nsay \"hi\nto f\nop 1\nend\ncopydef \"g \"f\nprint g";
    assert_eq!(run(source), "hi\nf defined\n1\n");
}

#[test]
fn erase_then_call_is_no_how() {
    let source = "to f\nop 1\nend\nignore f\nerase \"f\nprint f";
    let output = run(source);
    assert!(
        output.contains("I don't know how to f"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn erasing_a_primitive_is_rejected() {
    let output = run("erase \"print");
    assert!(
        output.contains("print is a primitive"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn define_installs_without_reading_lines() {
    let source = "define \"f [[x] [output :x + 1]]\nprint f 4";
    assert_eq!(run(source), "5\n");
}

#[test]
fn procedures_listing_contains_definitions() {
    let source = "to f\nend\nto g\nend\nshow procedures";
    assert_eq!(run(source), "f defined\ng defined\n[f g]\n");
}

#[test]
fn defined_and_primitive_predicates() {
    let source = "to f\nend\nprint procedurep \"f\nprint primitivep \"f\nprint primitivep \"sum\nprint definedp \"sum";
    assert_eq!(run(source), "f defined\ntrue\nfalse\ntrue\ntrue\n");
}

#[test]
fn traced_procedures_echo_calls_and_outputs() {
    let source = "to f :x\nop :x + 1\nend\ntrace \"f\nignore f 1";
    let output = run(source);
    assert!(output.contains("( f 1 )"), "{output:?}");
    assert!(output.contains("f outputs 2"), "{output:?}");
}

// ---------------------------------------------------------------------------
// property lists
// ---------------------------------------------------------------------------

#[test]
fn pprop_gprop_remprop_round_trip() {
    let source = "pprop \"sky \"color \"blue\nprint gprop \"sky \"color\nremprop \"sky \"color\nshow gprop \"sky \"color\nprint plistp \"sky";
    assert_eq!(run(source), "blue\n[]\nfalse\n");
}

#[test]
fn plist_outputs_pairs_in_order() {
    let source = "pprop \"p \"a 1\npprop \"p \"b 2\nshow plist \"p";
    assert_eq!(run(source), "[a 1 b 2]\n");
}

// ---------------------------------------------------------------------------
// streams
// ---------------------------------------------------------------------------

fn temp_prefix(tag: &str) -> String {
    let dir = std::env::temp_dir().join(format!("tortuga-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir.to_string_lossy().into_owned()
}

#[test]
fn write_then_read_a_file() {
    let prefix = temp_prefix("rw");
    let source = format!(
        "setprefix \"{prefix}\nopenwrite \"data\nsetwrite \"data\nprint [hello file]\nsetwrite []\nclose \"data\nopenread \"data\nsetread \"data\nshow readlist\nsetread []\nclose \"data"
    );
    assert_eq!(run(&source), "[hello file]\n");
}

#[test]
fn reader_and_writer_report_redirection() {
    let prefix = temp_prefix("names");
    let source = format!(
        "setprefix \"{prefix}\nshow writer\nopenwrite \"out\nsetwrite \"out\nshow reader\nsetwrite []\nshow writer\nclose \"out"
    );
    // the middle SHOW lands in the redirected file, not on the console
    assert_eq!(run(&source), "[]\n[]\n");
}

#[test]
fn closing_an_unopened_file_errors() {
    let output = run("close \"nope");
    assert!(
        output.contains("file nope is not open"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn save_and_load_round_trip_the_workspace() {
    let prefix = temp_prefix("save");
    let define = format!(
        "setprefix \"{prefix}\nto f :x\nop :x * 2\nend\nmake \"seed 11\nsave \"ws"
    );
    let first = run(&define);
    assert!(first.contains("f defined"), "{first:?}");

    let reload = format!("setprefix \"{prefix}\nload \"ws\nprint f 4\nprint :seed");
    let output = run(&reload);
    assert!(output.ends_with("8\n11\n"), "unexpected output: {output:?}");
}

#[test]
fn eofp_sees_the_end_of_a_file() {
    let prefix = temp_prefix("eof");
    let source = format!(
        "setprefix \"{prefix}\nopenwrite \"e\nsetwrite \"e\nprint \"x\nsetwrite []\nclose \"e\nopenread \"e\nsetread \"e\nprint eofp\nignore readlist\nprint eofp\nsetread []\nclose \"e"
    );
    assert_eq!(run(&source), "false\ntrue\n");
}

// ---------------------------------------------------------------------------
// parse and runparse as primitives
// ---------------------------------------------------------------------------

#[test]
fn parse_tokenizes_a_word() {
    assert_eq!(run("show parse \"|print 2+3|"), "[print 2+3]\n");
}

#[test]
fn runparse_splits_operators() {
    assert_eq!(run("show runparse [2+3]"), "[2 + 3]\n");
}

#[test]
fn runparse_output_is_stable_under_reparse() {
    assert_eq!(
        run("show equalp runparse [2+3*4] runparse runparse [2+3*4]"),
        "true\n"
    );
}
