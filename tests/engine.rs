use std::thread;

use droplet::{value, Engine, Syntax};

#[test]
fn engine_debug() {
    let debug = format!("{:?}", Engine::new());
    assert!(debug.starts_with("Engine"));
    assert!(debug.contains("upcase"));
}

#[test]
fn engine_send_and_sync() {
    let engine = Engine::new();
    let handle = thread::spawn(move || {
        engine
            .compile("{{ lorem }}")
            .unwrap()
            .render(value! { lorem: "ipsum" })
            .unwrap()
    });
    assert_eq!(handle.join().unwrap(), "ipsum");
}

#[test]
fn engine_compile_non_static_source() -> droplet::Result<()> {
    let engine = Engine::new();
    let source = String::from("{{ lorem }}");
    let result = engine.compile(&source)?.render(value! { lorem: "ipsum" })?;
    assert_eq!(result, "ipsum");
    Ok(())
}

#[test]
fn engine_template_reused_across_contexts() -> droplet::Result<()> {
    let engine = Engine::new();
    let template = engine.compile("{% for x in xs %}{{ x }}{% endfor %}")?;
    assert_eq!(template.render(value! { xs: [1, 2] })?, "12");
    assert_eq!(template.render(value! { xs: ["a"] })?, "a");
    Ok(())
}

#[test]
fn engine_custom_syntax_trim_markers() -> droplet::Result<()> {
    let syntax = Syntax::builder().output("${", "}").tag("<%", "%>").build();
    let engine = Engine::with_syntax(syntax);
    let result = engine
        .compile("a  <%- if x -%>  ${- x -}  <%- endif -%>  b")?
        .render(value! { x: 1 })?;
    assert_eq!(result, "a1b");
    Ok(())
}

#[test]
fn engine_template_debug() {
    let engine = Engine::new();
    let template = engine.compile("{{ x }}").unwrap();
    assert!(format!("{template:?}").contains("{{ x }}"));
    let expr = engine.compile_expression("x").unwrap();
    assert!(format!("{expr:?}").starts_with("Expression"));
}
