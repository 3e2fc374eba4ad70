//! End-to-end interpreter tests: each one feeds source text through the
//! public API with a scripted host and checks what reaches the console.

use tortuga::{Interpreter, ScriptHost};

fn run(source: &str) -> String {
    let host = ScriptHost::new("");
    let output = host.output_handle();
    let mut interp = Interpreter::new(Box::new(host));
    interp.execute_text(source);
    output.text()
}

// ---------------------------------------------------------------------------
// arithmetic and expressions
// ---------------------------------------------------------------------------

#[test]
fn print_sum_of_two_numbers() {
    assert_eq!(run("print sum 2 3"), "5\n");
}

#[test]
fn parenthesised_sum_is_variadic() {
    assert_eq!(run("print (sum 1 2 3 4)"), "10\n");
}

#[test]
fn infix_precedence_is_honored() {
    assert_eq!(run("print 2 + 3 * 4"), "14\n");
    assert_eq!(run("print (2 + 3) * 4"), "20\n");
}

#[test]
fn unary_minus_binds_to_the_following_term() {
    assert_eq!(run("make \"x 5\nprint -:x"), "-5\n");
    assert_eq!(run("print minus 7"), "-7\n");
}

#[test]
fn division_produces_fractions() {
    assert_eq!(run("print 10 / 4"), "2.5\n");
    assert_eq!(run("print 7 % 3"), "1\n");
    assert_eq!(run("print int 3.9"), "3\n");
    assert_eq!(run("print round 3.5"), "4\n");
}

#[test]
fn comparisons_yield_boolean_words() {
    assert_eq!(run("print 1 < 2"), "true\n");
    assert_eq!(run("print 1 > 2"), "false\n");
    assert_eq!(run("print 2 >= 2"), "true\n");
    assert_eq!(run("print 2 <> 2"), "false\n");
}

#[test]
fn logic_operators_short_circuit_over_lists() {
    assert_eq!(run("print and 1 < 2 2 < 3"), "true\n");
    assert_eq!(run("print or 2 < 1 2 < 3"), "true\n");
    assert_eq!(run("print not 1 > 2"), "true\n");
    // the second operand would divide by zero if it were evaluated
    assert_eq!(run("print (or [1 < 2] [print 1 / 0])"), "true\n");
}

// ---------------------------------------------------------------------------
// words, lists, arrays
// ---------------------------------------------------------------------------

#[test]
fn first_and_last_of_a_list_variable() {
    assert_eq!(
        run("make \"x [a b c]  print first :x  print last :x"),
        "a\nc\n"
    );
}

#[test]
fn butfirst_of_a_word() {
    assert_eq!(run("print butfirst \"hello"), "ello\n");
}

#[test]
fn butfirst_of_empty_input_is_rejected_by_the_validator() {
    let output = run("print butfirst []");
    assert!(
        output.contains("not enough inputs to butfirst"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn word_and_sentence_constructors() {
    assert_eq!(run("print word \"fu \"bar"), "fubar\n");
    assert_eq!(run("print sentence [a b] [c d]"), "a b c d\n");
    assert_eq!(run("print fput \"a [b c]"), "a b c\n");
    assert_eq!(run("print lput \"c [a b]"), "a b c\n");
}

#[test]
fn show_keeps_brackets_print_drops_them() {
    assert_eq!(run("show [a [b c]]"), "[a [b c]]\n");
    assert_eq!(run("print [a [b c]]"), "a [b c]\n");
}

#[test]
fn count_and_item_across_types() {
    assert_eq!(run("print count \"hello"), "5\n");
    assert_eq!(run("print count [a b c]"), "3\n");
    assert_eq!(run("print item 2 \"abc"), "b\n");
    assert_eq!(run("print item 2 [a b c]"), "b\n");
}

#[test]
fn arrays_honor_their_origin() {
    assert_eq!(
        run("make \"a (array 3 0)\nsetitem 0 :a \"x\nprint item 0 :a"),
        "x\n"
    );
    assert_eq!(run("show {a b c}@0"), "{a b c}@0\n");
    assert_eq!(run("print arraytolist {a b c}"), "a b c\n");
}

#[test]
fn setitem_refuses_to_create_a_cycle() {
    let output = run("make \"a (array 1)\nsetitem 1 :a :a");
    assert!(
        output.contains("doesn't like"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn dot_setfirst_mutates_shared_structure() {
    assert_eq!(
        run("make \"x [a b]\n.setfirst :x \"z\nprint :x"),
        "z b\n"
    );
}

#[test]
fn equality_honors_caseignoredp() {
    assert_eq!(run("print equalp \"Hello \"hello"), "true\n");
    assert_eq!(
        run("make \"caseignoredp \"false\nprint equalp \"Hello \"hello"),
        "false\n"
    );
}

#[test]
fn numeric_words_compare_as_numbers() {
    assert_eq!(run("print equalp \"2 \"2.0"), "true\n");
    assert_eq!(run("print numberp \"1e3"), "true\n");
    assert_eq!(run("print numberp \"banana"), "false\n");
}

#[test]
fn member_and_memberp() {
    assert_eq!(run("print memberp \"b [a b c]"), "true\n");
    assert_eq!(run("print member \"b [a b c]"), "b c\n");
    assert_eq!(run("print member \"x \"boxes"), "xes\n");
}

// ---------------------------------------------------------------------------
// procedures
// ---------------------------------------------------------------------------

#[test]
fn recursive_factorial_outputs() {
    let source = "to f :n\nif :n < 2 [op 1]\nop :n * f :n-1\nend\nprint f 5";
    assert_eq!(run(source), "f defined\n120\n");
}

#[test]
fn output_passes_any_datum_through() {
    let source = "to p :x\noutput :x\nend\nprint p \"hi\nprint p [a b]";
    assert_eq!(run(source), "p defined\nhi\na b\n");
}

#[test]
fn optional_parameters_use_default_expressions() {
    let source = "to greet [:who \"world]\nprint word \"hello :who\nend\ngreet\n(greet \"logo)";
    assert_eq!(run(source), "greet defined\nhelloworld\nhellologo\n");
}

#[test]
fn rest_parameter_collects_extras() {
    let source = "to all [:rest]\nprint :rest\nend\n(all 1 2 3)";
    assert_eq!(run(source), "all defined\n1 2 3\n");
}

#[test]
fn local_variables_shadow_globals() {
    let source = "to h\nlocal \"x\nmake \"x 1\nop :x\nend\nmake \"x 9\nprint h\nprint :x";
    assert_eq!(run(source), "h defined\n1\n9\n");
}

#[test]
fn redefining_with_to_is_an_error() {
    let source = "to f\nend\nto f\nend";
    let output = run(source);
    assert!(
        output.contains("f is already defined"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn to_inside_a_procedure_is_rejected() {
    let source = "to outer\nto inner\nend\nouter";
    let output = run(source);
    assert!(
        output.contains("can't use to inside a procedure"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn stop_unwinds_without_a_value() {
    let source = "to s\nprint \"in\nstop\nprint \"unreached\nend\ns";
    assert_eq!(run(source), "s defined\nin\n");
}

#[test]
fn stack_overflow_is_reported() {
    // runs in its own wide-stack thread: a thousand activations are legal
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| run("to r\nr\nend\nr"))
        .expect("spawn test thread");
    let output = handle.join().expect("join test thread");
    assert!(
        output.contains("stack overflow"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn dangling_value_is_a_dont_say_error() {
    let output = run("sum 2 3");
    assert!(
        output.contains("You don't say what to do with 5"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn missing_procedure_is_no_how() {
    let output = run("frobnicate 9");
    assert!(
        output.contains("I don't know how to frobnicate"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn errors_name_the_enclosing_procedure() {
    let source = "to f\nprint 1 / 0\nend\nf";
    let output = run(source);
    assert!(output.contains(" in f"), "unexpected output: {output:?}");
    assert!(
        output.contains("print 1 / 0"),
        "the failing source line should be echoed: {output:?}"
    );
}

// ---------------------------------------------------------------------------
// macros
// ---------------------------------------------------------------------------

#[test]
fn macro_output_is_reevaluated_in_the_caller() {
    let source = ".macro twice :x\nop (list \"print :x * 2)\nend\ntwice 21";
    assert_eq!(run(source), "twice defined\n42\n");
}

#[test]
fn macro_can_assign_in_the_callers_frame() {
    let source = ".macro setit\nop [make \"y 7]\nend\nto caller\nlocal \"y\nsetit\nop :y\nend\nprint caller";
    assert_eq!(run(source), "setit defined\ncaller defined\n7\n");
}

#[test]
fn macrop_distinguishes_macros() {
    let source = ".macro m\nop []\nend\nto f\nend\nprint macrop \"m\nprint macrop \"f";
    assert_eq!(run(source), "m defined\nf defined\ntrue\nfalse\n");
}

// ---------------------------------------------------------------------------
// control flow
// ---------------------------------------------------------------------------

#[test]
fn repeat_tracks_repcount() {
    assert_eq!(run("repeat 3 [print repcount]"), "1\n2\n3\n");
}

#[test]
fn if_and_ifelse_run_their_branches() {
    assert_eq!(run("if 1 < 2 [print \"yes]"), "yes\n");
    assert_eq!(run("print ifelse 1 > 2 [\"yes] [\"no]"), "no\n");
    assert_eq!(run("(if 1 > 2 [print \"a] [print \"b])"), "b\n");
}

#[test]
fn test_state_feeds_iftrue_and_iffalse() {
    assert_eq!(
        run("test 1 < 2\niftrue [print \"t]\niffalse [print \"f]"),
        "t\n"
    );
}

#[test]
fn inner_procedure_sees_outer_test() {
    let source = "to inner\niftrue [print \"seen]\nend\nto outer\ntest \"true\ninner\nend\nouter";
    assert_eq!(run(source), "inner defined\nouter defined\nseen\n");
}

#[test]
fn iftrue_without_test_is_an_error() {
    let output = run("iftrue [print \"x]");
    assert!(
        output.contains("without TEST"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn run_and_runresult() {
    assert_eq!(run("run [print \"go]"), "go\n");
    assert_eq!(run("print runresult [sum 1 2]"), "3\n");
    assert_eq!(run("print runresult [ignore 5]"), "\n");
}

#[test]
fn catch_returns_the_thrown_value() {
    let source = "to g\nop catch \"oops [throw \"oops \"hello]\nend\nprint g";
    assert_eq!(run(source), "g defined\nhello\n");
}

#[test]
fn catch_error_is_the_wildcard() {
    assert_eq!(run("catch \"error [print 1 / 0]\nprint \"after"), "after\n");
}

#[test]
fn error_outputs_the_caught_error() {
    let output = run("catch \"error [print 1 / 0]\nprint first error");
    // code 4: doesn't-like
    assert_eq!(output, "4\n");
}

#[test]
fn uncaught_throw_reports_no_catch() {
    let output = run("throw \"oops");
    assert!(
        output.contains("Can't find catch tag for oops"),
        "unexpected output: {output:?}"
    );
    // code 14: no-catch — the error value carries it even when the
    // wildcard CATCH consumes the throw
    assert_eq!(run("catch \"error [throw \"oops]\nprint first error"), "14\n");
}

#[test]
fn goto_jumps_to_the_tag_and_skips_between() {
    let source = "to loop\ntag \"top\nif :n > 5 [stop]\nmake \"n :n + 1\ngoto \"top\nend\nmake \"n 0\nloop\nprint :n";
    assert_eq!(run(source), "loop defined\n6\n");
}

#[test]
fn goto_skips_lines_before_the_tag() {
    let source = "to j\ngoto \"skip\nprint \"never\ntag \"skip\nprint \"landed\nend\nj";
    assert_eq!(run(source), "j defined\nlanded\n");
}

#[test]
fn goto_outside_a_procedure_is_rejected() {
    let output = run("goto \"x");
    assert!(
        output.contains("can only use goto inside a procedure"),
        "unexpected output: {output:?}"
    );
}

#[test]
fn apply_calls_procedures_and_templates() {
    let source = "to add2 :a :b\nop :a + :b\nend\nprint apply \"add2 [3 4]\nprint apply \"sum [5 6]\nprint apply [? * ?] [9]";
    assert_eq!(run(source), "add2 defined\n7\n11\n81\n");
}

#[test]
fn numbered_slots_read_apply_inputs() {
    assert_eq!(run("print apply [word ?2 ?1] [a b]"), "ba\n");
}

#[test]
fn pause_resumes_with_the_continue_value() {
    let source = "to p\nprint \"before\nprint pause\nprint \"after\nend\np\ncontinue 42";
    assert_eq!(
        run(source),
        "p defined\nbefore\nPausing...\n42\nafter\n"
    );
}

#[test]
fn maybeoutput_stops_or_outputs() {
    let source = "to v :x\n.maybeoutput run :x\nend\nprint v [sum 1 2]";
    assert_eq!(run(source), "v defined\n3\n");
}

// ---------------------------------------------------------------------------
// reader behaviors visible from the REPL
// ---------------------------------------------------------------------------

#[test]
fn semicolon_comments_are_stripped() {
    assert_eq!(run("print 1 ; a comment"), "1\n");
}

#[test]
fn vbarred_words_keep_their_delimiters() {
    assert_eq!(run("print \"|two words|"), "two words\n");
    assert_eq!(run("print vbarredp \"plain"), "false\n");
}

#[test]
fn tilde_joins_continuation_lines() {
    assert_eq!(run("print sum 1 ~\n2"), "3\n");
}

#[test]
fn unexpected_close_bracket_reports_and_recovers() {
    let output = run("print ]\nprint \"ok");
    assert!(
        output.contains("unexpected ']'"),
        "unexpected output: {output:?}"
    );
    assert!(output.ends_with("ok\n"), "unexpected output: {output:?}");
}

// ---------------------------------------------------------------------------
// getters and setters behind ALLOWGETSET
// ---------------------------------------------------------------------------

#[test]
fn allowgetset_resolves_bare_names() {
    assert_eq!(run("make \"foo 1\nprint foo"), "1\n");
    assert_eq!(run("setfoo 7\nprint :foo"), "7\n");
}

// ---------------------------------------------------------------------------
// interrupt signals
// ---------------------------------------------------------------------------

#[test]
fn toplevel_signal_unwinds_a_running_procedure() {
    let mut host = ScriptHost::new("");
    for _ in 0..16 {
        host.push_signal(tortuga::HostSignal::Toplevel);
    }
    let output = host.output_handle();
    let mut interp = Interpreter::new(Box::new(host));
    interp.execute_text("to spin\nforever [make \"n :n + 1]\nend\nmake \"n 0\nspin\nprint \"free");
    assert!(
        output.text().ends_with("free\n"),
        "unexpected output: {:?}",
        output.text()
    );
}

#[test]
fn turtle_ops_without_graphics_raise_no_graphics() {
    let output = run("forward 10");
    assert!(
        output.contains("graphics not initialized"),
        "unexpected output: {output:?}"
    );
}
