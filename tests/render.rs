mod helpers;

use droplet::{value, Engine, ErrorKind, Value};
use pretty_assertions::assert_eq;

use crate::helpers::Writer;

#[track_caller]
fn render(source: &str, ctx: Value) -> String {
    Engine::new()
        .compile(source)
        .unwrap()
        .render_from(&ctx)
        .unwrap()
}

#[test]
fn render_raw() {
    assert_eq!(render("lorem ipsum", Value::None), "lorem ipsum");
}

#[test]
fn render_output_scalars() {
    let ctx = value! { b: true, i: 123_i64, f: 123.4_f64, whole: 2.0, s: "dolor", n: None };
    let result = render("{{ b }} {{ i }} {{ f }} {{ whole }} {{ s }} [{{ n }}]", ctx);
    assert_eq!(result, "true 123 123.4 2.0 dolor []");
}

#[test]
fn render_output_list_concatenates() {
    let result = render("{{ list }}", value! { list: ["a", 1, ["b", None]] });
    assert_eq!(result, "a1b");
}

#[test]
fn render_output_missing_variable_is_empty() {
    assert_eq!(render("[{{ missing.deep[0] }}]", Value::None), "[]");
}

#[test]
fn render_output_property_and_index() {
    let ctx = value! {
        user: { name: "John", tags: ["a", "b", "c"] },
        key: "name",
        i: -1,
    };
    let result = render(
        "{{ user.name }} {{ user[key] }} {{ user.tags[0] }} {{ user.tags[i] }} {{ user.tags.size }} {{ user.tags.first }}{{ user.tags.last }}",
        ctx,
    );
    assert_eq!(result, "John John a c 3 ac");
}

#[test]
fn render_output_literals() {
    let result = render(
        r#"{{ "double" }} {{ 'single' }} {{ -3 }} {{ 1.5 }} {{ nil }}{{ true }}"#,
        Value::None,
    );
    assert_eq!(result, "double single -3 1.5 true");
}

#[test]
fn render_output_range_materializes() {
    assert_eq!(render("{{ (1..4) | join: ',' }}", Value::None), "1,2,3,4");
}

#[test]
fn render_output_range_err_too_large() {
    let err = Engine::new()
        .compile("{{ (0..9223372036854775807) | size }}")
        .unwrap()
        .render_from(&Value::None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(
        err.to_string(),
        "range of 9223372036854775808 integers is too large between bytes 3 and 27"
    );
}

#[test]
fn render_output_range_large_loop_source_is_lazy() {
    let result = render(
        "{% for i in (0..9223372036854775807) limit:2 %}{{ i }}.{% endfor %}",
        Value::None,
    );
    assert_eq!(result, "0.1.");
}

#[test]
fn render_output_err_map() {
    let err = Engine::new()
        .compile("lorem {{ ipsum }}")
        .unwrap()
        .render_from(&value! { ipsum: {} })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(
        format!("{:#}", err),
        "
   |
 1 | lorem {{ ipsum }}
   |          ^^^^^ expected renderable value, but expression evaluated to map
"
    );
}

#[test]
fn render_if_elsif_else() {
    let source = "{% if n > 2 %}big{% elsif n == 2 %}two{% else %}small{% endif %}";
    assert_eq!(render(source, value! { n: 3 }), "big");
    assert_eq!(render(source, value! { n: 2 }), "two");
    assert_eq!(render(source, value! { n: 1.5 }), "small");
}

#[test]
fn render_if_truthiness() {
    let cases = [
        (value! { x: None }, "no"),
        (value! { x: false }, "no"),
        (value! { x: 0 }, "yes"),
        (value! { x: "" }, "no"),
        (value! { x: [] }, "no"),
        (value! { x: " " }, "yes"),
        (value! { x: [None] }, "yes"),
        (value! {}, "no"),
    ];
    for (ctx, expected) in cases {
        assert_eq!(render("{% if x %}yes{% else %}no{% endif %}", ctx), expected);
    }
}

#[test]
fn render_if_logical_operators() {
    let ctx = value! { a: true, b: false, list: ["x", "y"], s: "hello" };
    let result = render(
        "{% if a and b %}1{% endif %}{% if a or b %}2{% endif %}{% if list contains 'y' %}3{% endif %}{% if 'ell' in s %}4{% endif %}{% if b or a and false %}5{% endif %}",
        ctx,
    );
    assert_eq!(result, "234");
}

#[test]
fn render_if_comparisons() {
    let ctx = value! { i: 1, f: 1.0, s: "b" };
    let result = render(
        "{% if i == f %}a{% endif %}{% if i != 2 %}b{% endif %}{% if i <> 2 %}c{% endif %}{% if s > 'a' %}d{% endif %}{% if i >= 1 %}e{% endif %}{% if i <= 0 %}f{% endif %}{% if s < 1 %}g{% endif %}",
        ctx,
    );
    assert_eq!(result, "abcde");
}

#[test]
fn render_unless() {
    let source = "{% unless x %}not{% else %}is{% endunless %}";
    assert_eq!(render(source, value! { x: false }), "not");
    assert_eq!(render(source, value! { x: true }), "is");
}

#[test]
fn render_case() {
    let source = "{% case x %}ignored{% when 1, 2 %}low{% when 3 4 %}mid{% when 'z' %}z{% else %}other{% endcase %}";
    assert_eq!(render(source, value! { x: 2 }), "low");
    assert_eq!(render(source, value! { x: 4.0 }), "mid");
    assert_eq!(render(source, value! { x: "z" }), "z");
    assert_eq!(render(source, value! { x: 9 }), "other");
}

#[test]
fn render_case_first_match_wins() {
    let source = "{% case x %}{% when 1 %}one{% when 1 %}again{% endcase %}";
    assert_eq!(render(source, value! { x: 1 }), "one");
}

#[test]
fn render_assign() {
    let result = render(
        "{% assign greeting = 'hi' | upcase %}{{ greeting }} {% for i in (1..2) %}{% assign last = i %}{% endfor %}{{ last }}",
        Value::None,
    );
    assert_eq!(result, "HI 2");
}

#[test]
fn render_assign_shadows_context() {
    let result = render("{{ x }}{% assign x = 2 %}{{ x }}", value! { x: 1 });
    assert_eq!(result, "12");
}

#[test]
fn render_comment() {
    let result = render(
        "a{% comment %}{{ x }}{% comment %}{% if %}{% endcomment %}{% endcomment %}b",
        Value::None,
    );
    assert_eq!(result, "ab");
}

#[test]
fn render_whitespace_trim() {
    let result = render(
        "<ul>\n  {%- for i in (1..2) %}\n  <li>{{- i -}} </li>\n  {%- endfor %}\n</ul>",
        Value::None,
    );
    assert_eq!(result, "<ul>\n  <li>1</li>\n  <li>2</li>\n</ul>");
}

#[test]
fn render_custom_syntax() {
    let syntax = droplet::Syntax::builder().output("<?", "?>").tag("<%", "%>").build();
    let result = Engine::with_syntax(syntax)
        .compile("<% if x %><? x ?><% endif %> {{ x }}")
        .unwrap()
        .render_from(&value! { x: 1 })
        .unwrap();
    assert_eq!(result, "1 {{ x }}");
}

#[cfg(feature = "serde")]
#[test]
fn render_serde_context() {
    #[derive(serde::Serialize)]
    struct Context {
        user: User,
    }

    #[derive(serde::Serialize)]
    struct User {
        name: String,
        age: u8,
    }

    let ctx = Context {
        user: User {
            name: "Ada".into(),
            age: 36,
        },
    };
    let result = Engine::new()
        .compile("{{ user.name }} is {{ user.age }}")
        .unwrap()
        .render(&ctx)
        .unwrap();
    assert_eq!(result, "Ada is 36");
}

#[cfg(feature = "serde")]
#[test]
fn render_to_writer() {
    let mut w = Writer::new();
    Engine::new()
        .compile("{% for i in (1..3) %}{{ i }}{% endfor %}")
        .unwrap()
        .render_to_writer(&mut w, value! {})
        .unwrap();
    assert_eq!(w.into_string(), "123");
}

#[cfg(feature = "serde")]
#[test]
fn render_to_writer_err() {
    let mut w = Writer::with_max(1);
    let err = Engine::new()
        .compile("lorem {{ ipsum }}")
        .unwrap()
        .render_to_writer(&mut w, value! { ipsum: "dolor" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(format!("{:#}", err), "io error: address in use");
}

#[test]
fn render_template_source() {
    let engine = Engine::new();
    let template = engine.compile("{{ x }}").unwrap();
    assert_eq!(template.source(), "{{ x }}");
}
