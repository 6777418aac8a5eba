//! Integration tests for the routine-source lexer.

use glw_lexer::{Lexer, TokenKind};
use glw_types::SourceFile;

fn lex(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.js", source);
    let result = Lexer::new(&sf).lex();
    assert!(
        !result.errors.has_errors(),
        "unexpected lex errors: {:?}",
        result.errors.errors
    );
    result.tokens.into_iter().map(|t| t.kind).collect()
}

fn lex_errors(source: &str) -> glw_types::AnalyzeErrors {
    let sf = SourceFile::new("test.js", source);
    Lexer::new(&sf).lex().errors
}

#[test]
fn keywords_and_identifiers() {
    let tokens = lex("export function create() {}");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Export,
            TokenKind::Function,
            TokenKind::Ident("create".into()),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn contextual_words_stay_identifiers() {
    let tokens = lex("of from as");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident("of".into()),
            TokenKind::Ident("from".into()),
            TokenKind::Ident("as".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn dollar_identifiers() {
    let tokens = lex("$tmp _out");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident("$tmp".into()),
            TokenKind::Ident("_out".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn number_forms() {
    let tokens = lex("42 3.14 .5 1e-6 0xff");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Number(42.0),
            TokenKind::Number(3.14),
            TokenKind::Number(0.5),
            TokenKind::Number(1e-6),
            TokenKind::Number(255.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_escapes() {
    let tokens = lex(r#"'a\nb' "c\"d""#);
    assert_eq!(
        tokens,
        vec![
            TokenKind::Str("a\nb".into()),
            TokenKind::Str("c\"d".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn template_literal_captured_raw() {
    let tokens = lex("`vec3(${ view[0] }, ${ view[1] })`");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Template("vec3(${ view[0] }, ${ view[1] })".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn template_tracks_nested_braces() {
    let tokens = lex("`a${ {x: 1}.x }b`");
    assert_eq!(
        tokens,
        vec![TokenKind::Template("a${ {x: 1}.x }b".into()), TokenKind::Eof]
    );
}

#[test]
fn operator_longest_match() {
    let tokens = lex("a >>> 2 === b => ** !==");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::UShr,
            TokenKind::Number(2.0),
            TokenKind::EqEqEq,
            TokenKind::Ident("b".into()),
            TokenKind::Arrow,
            TokenKind::StarStar,
            TokenKind::NotEqEq,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn dot_vs_leading_dot_number() {
    let tokens = lex("a.b .5");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::Dot,
            TokenKind::Ident("b".into()),
            TokenKind::Number(0.5),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_stripped() {
    let tokens = lex("a // trailing\n/* block\n * @param {vec3} out */ b");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::Ident("b".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unterminated_string_reported() {
    let errors = lex_errors("'oops");
    assert!(errors.has_errors());
    assert_eq!(errors.errors[0].code, glw_types::ErrorCode::UNTERMINATED_STRING);
}

#[test]
fn unterminated_comment_reported() {
    let errors = lex_errors("/* never closed");
    assert!(errors.has_errors());
    assert_eq!(
        errors.errors[0].code,
        glw_types::ErrorCode::UNTERMINATED_COMMENT
    );
}

#[test]
fn stray_character_recovers() {
    let sf = SourceFile::new("test.js", "a # b");
    let result = Lexer::new(&sf).lex();
    assert!(result.errors.has_errors());
    // Both identifiers still lexed around the stray byte.
    let kinds: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::Ident("b".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn stream_always_ends_with_eof() {
    let sf = SourceFile::new("test.js", "");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.last().map(|t| t.kind.clone()), Some(TokenKind::Eof));
}

#[test]
fn spans_are_byte_offsets() {
    let sf = SourceFile::new("test.js", "let out");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens[0].span, glw_types::Span::new(0, 3));
    assert_eq!(result.tokens[1].span, glw_types::Span::new(4, 7));
}

#[test]
fn gl_matrix_style_snippet() {
    let source = r"
export function create() {
  let out = new glMatrix.ARRAY_TYPE(3);
  out[0] = 0;
  return out;
}
";
    let tokens = lex(source);
    assert!(tokens.contains(&TokenKind::Export));
    assert!(tokens.contains(&TokenKind::New));
    assert!(tokens.contains(&TokenKind::Ident("glMatrix".into())));
    assert!(tokens.contains(&TokenKind::Ident("ARRAY_TYPE".into())));
    assert!(tokens.contains(&TokenKind::Return));
}
