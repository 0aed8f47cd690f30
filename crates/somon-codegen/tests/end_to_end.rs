//! End-to-end compile-and-compare scenarios (`spec.md` §8, "End-to-end
//! scenarios").

fn compile(source: &str) -> String {
    let tokens = somon_lexer::tokenize(source).expect("lex");
    let program = somon_parser::parse(tokens).expect("parse");
    somon_codegen::generate(&program)
}

#[test]
fn simple_variable() {
    assert_eq!(compile("собит PI = 3.14;"), "const PI = 3.14;\n");
}

#[test]
fn function_with_erased_annotations() {
    let js = compile("функсия ҷамъ(a: рақам, b: рақам): рақам { баргардон a + b; }");
    assert_eq!(js, "function ҷамъ(a, b) {\n  return a + b;\n}\n");
}

#[test]
fn console_call_is_preserved() {
    assert_eq!(compile("console.log(\"hi\");"), "console.log(\"hi\");\n");
}

#[test]
fn import_named_binding() {
    let js = compile("содир { add } аз \"./math.som\"; console.log(add(1, 2));");
    assert_eq!(
        js,
        "const __somon_import_0 = require(\"./math.js\");\nconst { add } = __somon_import_0;\nconsole.log(add(1, 2));\n"
    );
}

#[test]
fn console_error_member_specializes_to_lowercase() {
    let js = compile("console.Error(\"boom\");");
    assert_eq!(js, "console.error(\"boom\");\n");
}

#[test]
fn binary_operand_parenthesization_is_conservative() {
    let js = compile("собит x = (1 + 2) * 3;");
    assert_eq!(js, "const x = (1 + 2) * 3;\n");
}

#[test]
fn class_with_extends_and_modifiers_erased() {
    let js = compile("синф Сагвор густариш Ҳайвон { созанда() { ин.ном = \"рекс\"; } }");
    assert_eq!(js, "class Сагвор extends Ҳайвон {\n  constructor() {\n    this.ном = \"рекс\";\n  }\n}\n");
}

#[test]
fn interface_emits_comment_only() {
    assert_eq!(compile("интерфейс Ҷуфт { калид: сатр; }"), "// Interface: Ҷуфт\n");
}

#[test]
fn case_mismatched_builtin_method_is_corrected_on_an_ordinary_receiver() {
    assert_eq!(compile("рӯйхат.Push(1);"), "рӯйхат.push(1);\n");
}

#[test]
fn user_defined_receiver_keeps_its_own_casing() {
    assert_eq!(compile("Стек.Push(1);"), "Стек.Push(1);\n");
}
