//! Integration tests for the oscine pipeline as a whole: lex -> parse ->
//! eval -> print, driven through [`Interp::eval_string`] exactly the way
//! an embedder would, one Scheme snippet at a time. Where
//! `examples/vrtbl-passerine`'s own `tests/fledgling.rs` drives its
//! pipeline with on-disk snippet files carrying a `-- outcome: ...`
//! heading, this interpreter's exercised subset is small and fixed
//! enough (spec.md §1's Non-goals) that each snippet is just a literal
//! Rust string -- there is no snippet corpus to load.

use oscine::print::print;
use oscine::Interp;

fn eval_one(src: &str) -> String {
    let interp = Interp::new();
    let results = interp.eval_string(src).unwrap_or_else(|e| panic!("eval failed: {}\n{}", src, e));
    print(results.last().expect("at least one top-level form"))
}

fn eval_fails(src: &str) {
    let interp = Interp::new();
    assert!(interp.eval_string(src).is_err(), "expected an error evaluating: {}", src);
}

// -- spec.md §8's six end-to-end scenarios, verbatim --

#[test]
fn scenario_addition() {
    assert_eq!(eval_one("(+ 1 2)"), "3");
}

#[test]
fn scenario_define_then_reference() {
    assert_eq!(eval_one("(define x 42) x"), "42");
}

#[test]
fn scenario_lambda_application() {
    assert_eq!(eval_one("((lambda (x y) (+ x y)) 3 4)"), "7");
}

#[test]
fn scenario_let() {
    assert_eq!(eval_one("(let ((x 2) (y 3)) (* x y))"), "6");
}

#[test]
fn scenario_quoted_dotted_list() {
    assert_eq!(eval_one("'(a b . c)"), "(a b . c)");
}

#[test]
fn scenario_cond() {
    assert_eq!(eval_one("(cond ((= 1 2) 'no) ((= 1 1) 'yes) (else 'never))"), "yes");
}

// -- special forms beyond the six named scenarios --

#[test]
fn let_star_sees_previous_bindings() {
    assert_eq!(eval_one("(let* ((x 2) (y (* x x))) y)"), "4");
}

#[test]
fn letrec_supports_mutual_recursion() {
    let src = "
        (letrec ((even? (lambda (n) (if (= n 0) #t (odd? (- n 1)))))
                 (odd?  (lambda (n) (if (= n 0) #f (even? (- n 1))))))
          (even? 10))
    ";
    assert_eq!(eval_one(src), "#t");
}

#[test]
fn named_let_loop() {
    let src = "
        (let loop ((n 5) (acc 1))
          (if (= n 0) acc (loop (- n 1) (* acc n))))
    ";
    assert_eq!(eval_one(src), "120");
}

#[test]
fn do_loop_sums_a_range() {
    let src = "(do ((i 0 (+ i 1)) (sum 0 (+ sum i))) ((= i 5) sum))";
    assert_eq!(eval_one(src), "10");
}

#[test]
fn case_dispatches_on_datum_membership() {
    let src = "(case (* 2 3) ((2 3 5 7) 'prime) ((1 4 6 8 9) 'composite) (else 'other))";
    assert_eq!(eval_one(src), "composite");
}

#[test]
fn and_or_short_circuit() {
    // A symbol reference to an unbound name would error if evaluated;
    // `and`/`or` must never reach it once the outcome is already decided
    // (spec.md §8).
    assert_eq!(eval_one("(and #f totally-unbound)"), "#f");
    assert_eq!(eval_one("(or #t totally-unbound)"), "#t");
    assert_eq!(eval_one("(and 1 2 3)"), "3");
    assert_eq!(eval_one("(or #f #f)"), "#f");
}

#[test]
fn set_bang_mutates_enclosing_binding() {
    assert_eq!(eval_one("(define x 1) (set! x (+ x 1)) x"), "2");
}

#[test]
fn optional_and_rest_formals() {
    assert_eq!(eval_one("(define (greet name #!optional (greeting \"hi\")) greeting) (greet \"a\")"), "\"hi\"");
    assert_eq!(
        eval_one("(define (sum #!rest xs) (if (null? xs) 0 (+ (car xs) (apply sum (cdr xs))))) (sum 1 2 3 4)"),
        "10"
    );
}

#[test]
fn quasiquote_splices_and_unquotes() {
    assert_eq!(eval_one("(define x 5) `(a ,x c)"), "(a 5 c)");
    assert_eq!(eval_one("(define xs (list 1 2 3)) `(a ,@xs b)"), "(a 1 2 3 b)");
}

#[test]
fn vectors_evaluate_elementwise() {
    assert_eq!(eval_one("(define x 9) #(1 2 x)"), "#(1 2 9)");
}

#[test]
fn delay_wraps_a_thunk() {
    assert_eq!(eval_one("((delay (+ 1 2)))"), "3");
}

// -- error paths spec.md §7 names --

#[test]
fn unresolved_symbol_errors() {
    eval_fails("not-a-thing");
}

#[test]
fn arity_error_on_primitive() {
    eval_fails("(not 1 2)");
}

#[test]
fn applying_a_non_procedure_errors() {
    eval_fails("(1 2 3)");
}

#[test]
fn else_outside_tail_position_errors() {
    eval_fails("(cond (else 1) (#t 2))");
}

#[test]
fn unbalanced_parens_is_a_syntax_error() {
    let interp = Interp::new();
    assert!(interp.eval_string("(+ 1 2").is_err());
}
