//! S2 — `%define` followed by a reference on the next line. The macro
//! engine expands one line at a time (as the spec line reader drives
//! it), so `%define` only consumes the rest of its own line.

use rpmkit_macro::MacroContext;

#[test]
fn define_then_reference_expands_on_the_next_line() {
    let mut ctx = MacroContext::new();

    let mut define_line = b"%define foo bar".to_vec();
    ctx.expand(&mut define_line).unwrap();
    assert!(define_line.is_empty());

    let mut reference_line = b"%foo-%{foo}-%%foo".to_vec();
    ctx.expand(&mut reference_line).unwrap();
    assert_eq!(String::from_utf8(reference_line).unwrap(), "bar-bar-%foo");
}
