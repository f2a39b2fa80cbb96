use droplet::{value, Engine, ErrorKind, Value};
use pretty_assertions::assert_eq;

fn bindings() -> Value {
    value! {
        array: ["first", "second", "third"],
        hash: { a: 1 },
        products: [
            "Cool Shirt",
            "Alien Poster",
            "Batman Poster",
            "Bullseye Shirt",
            "Another Classic Vinyl",
            "Awesome Jeans",
        ],
    }
}

#[track_caller]
fn render(source: &str) -> String {
    Engine::new()
        .compile(source)
        .unwrap()
        .render_from(&bindings())
        .unwrap()
}

#[track_caller]
fn render_err(source: &str) -> droplet::Error {
    Engine::new()
        .compile(source)
        .unwrap()
        .render_from(&bindings())
        .unwrap_err()
}

#[test]
fn for_list() {
    let result = render("{% for a in array %}{{ a }} {% endfor %}");
    assert_eq!(result, "first second third ");
}

#[test]
fn for_modifiers() {
    let cases = [
        ("reversed", "third.second.first."),
        ("limit:2", "first.second."),
        ("offset:1", "second.third."),
        ("offset:1 limit:1", "second."),
        ("limit:1 offset:1", "second."),
        ("reversed offset:1", "third.second."),
        ("reversed limit:1", "first."),
        ("reversed limit:1 offset:1", "second."),
        ("limit:0", ""),
        ("offset:10", ""),
        ("limit:-1", ""),
        ("offset:-3", "first.second.third."),
    ];
    for (modifiers, expected) in cases {
        let source = format!("{{% for a in array {modifiers} %}}{{{{ a }}}}.{{% endfor %}}");
        assert_eq!(render(&source), expected, "{source}");
    }
}

#[test]
fn for_modifier_values_are_expressions() {
    let result = Engine::new()
        .compile("{% for a in array limit: n offset: '1' %}{{ a }}.{% endfor %}")
        .unwrap()
        .render_from(&value! { array: [1, 2, 3, 4], n: 2.0 })
        .unwrap();
    assert_eq!(result, "2.3.");
}

#[test]
fn for_modifier_err_not_integer() {
    let err = Engine::new()
        .compile("{% for a in array limit: x %}{% endfor %}")
        .unwrap()
        .render_from(&value! { array: [1], x: "many" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(
        format!("{:#}", err),
        "
   |
 1 | {% for a in array limit: x %}{% endfor %}
   |                          ^ loop modifier `limit` expected integer, found string
"
    );
}

#[test]
fn forloop_variables() {
    let cases = [
        ("", "first", "true.false.false."),
        ("", "last", "false.false.true."),
        ("", "index", "1.2.3."),
        ("", "index0", "0.1.2."),
        ("", "rindex", "3.2.1."),
        ("", "rindex0", "2.1.0."),
        ("", "length", "3.3.3."),
        ("reversed", "first", "true.false.false."),
        ("reversed", "last", "false.false.true."),
        ("reversed", "index", "1.2.3."),
        ("reversed", "rindex", "3.2.1."),
        ("reversed", "length", "3.3.3."),
        ("limit:2", "index", "1.2."),
        ("limit:2", "rindex", "2.1."),
        ("limit:2", "first", "true.false."),
        ("limit:2", "last", "false.true."),
        ("limit:2", "length", "2.2."),
        ("offset:1", "index", "1.2."),
        ("offset:1", "rindex", "2.1."),
        ("offset:1", "first", "true.false."),
        ("offset:1", "last", "false.true."),
        ("offset:1", "length", "2.2."),
    ];
    for (modifiers, var, expected) in cases {
        let source =
            format!("{{% for a in array {modifiers} %}}{{{{ forloop.{var} }}}}.{{% endfor %}}");
        assert_eq!(render(&source), expected, "{source}");
    }
}

#[test]
fn forloop_nested_shadows_outer() {
    let result = render(
        "{% for i in array %}{{ forloop.index }}[{% for j in array %}{{ forloop.index }}{% endfor %}]{{ forloop.index }}{% endfor %}",
    );
    assert_eq!(result, "1[123]12[123]23[123]3");
}

#[test]
fn forloop_parentloop() {
    let result = render(
        "{% for i in (1..2) %}{% for j in (1..2) %}{{ forloop.parentloop.index }}{{ forloop.index }} {% endfor %}{% endfor %}",
    );
    assert_eq!(result, "11 12 21 22 ");
}

#[test]
fn for_loop_variable_shadows_and_restores() {
    let result = Engine::new()
        .compile("{{ a }}{% for a in array %}{{ a }}{% endfor %}{{ a }}")
        .unwrap()
        .render_from(&value! { a: "x", array: [1, 2] })
        .unwrap();
    assert_eq!(result, "x12x");
}

#[test]
fn for_break() {
    let result = render(
        "{% for a in array %}{% if a == 'second' %}{% break %}{% endif %}{{ a }}{% endfor %}",
    );
    assert_eq!(result, "first");
}

#[test]
fn for_continue() {
    let result = render(
        "{% for a in array %}{% if a == 'second' %}{% continue %}{% endif %}{{ a }}.{% endfor %}",
    );
    assert_eq!(result, "first.third.");
}

#[test]
fn for_break_inside_case_and_unless() {
    let result = render(
        "{% for a in array %}{% case a %}{% when 'third' %}{% break %}{% endcase %}{% unless a == 'first' %}{% continue %}{% endunless %}{{ a }}{% endfor %}",
    );
    assert_eq!(result, "first");
}

#[test]
fn for_break_only_exits_inner_loop() {
    let result = render(
        "{% for i in (1..3) %}{% for j in (1..3) %}{% if j == 2 %}{% break %}{% endif %}{{ i }}{{ j }} {% endfor %}{% endfor %}",
    );
    assert_eq!(result, "11 21 31 ");
}

#[test]
fn for_hash_yields_keys() {
    assert_eq!(render("{% for a in hash %}{{ a }}{% endfor %}"), "a");
}

#[test]
fn for_nil_and_string_sources() {
    let result = Engine::new()
        .compile("{% for a in missing %}x{% endfor %}|{% for a in s %}[{{ a }}]{% endfor %}")
        .unwrap()
        .render_from(&value! { s: "text" })
        .unwrap();
    assert_eq!(result, "|[text]");
}

#[test]
fn for_err_not_iterable() {
    let err = Engine::new()
        .compile("{% for a in n %}{% endfor %}")
        .unwrap()
        .render_from(&value! { n: 3 })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert_eq!(
        err.to_string(),
        "expected iterable, but expression evaluated to integer between bytes 12 and 13"
    );
}

#[test]
fn for_range() {
    assert_eq!(render("{% for i in (3 .. 5) %}{{i}}.{% endfor %}"), "3.4.5.");
    assert_eq!(render("{% for i in (3..5) %}{{i}}.{% endfor %}"), "3.4.5.");
    assert_eq!(render("{% for i in (5..3) %}{{i}}.{% endfor %}"), "");
    assert_eq!(render("{% for i in (-1..1) reversed %}{{i}}.{% endfor %}"), "1.0.-1.");
}

#[test]
fn for_range_bounds_are_expressions() {
    let result = Engine::new()
        .compile("{% for i in (a..array.size) %}{{ i }}{% endfor %}")
        .unwrap()
        .render_from(&value! { a: "2", array: [1, 2, 3, 4] })
        .unwrap();
    assert_eq!(result, "234");
}

#[test]
fn for_range_err_bound() {
    let err = render_err("{% for i in (1..array) %}{% endfor %}");
    assert_eq!(
        err.to_string(),
        "range bound must be an integer, found list between bytes 16 and 21"
    );
}

#[test]
fn cycle_anonymous() {
    let result = render("{% for a in array %}{% cycle 'even', 'odd' %}.{% endfor %}");
    assert_eq!(result, "even.odd.even.");
}

#[test]
fn cycle_same_values_share_a_group() {
    let result = render("{% for a in array %}{% cycle '0', '1' %},{% cycle '0', '1' %}.{% endfor %}");
    assert_eq!(result, "0,1.0,1.0,1.");
}

#[test]
fn cycle_quote_style_and_spacing_share_a_group() {
    let result = render("{% for a in array %}{% cycle '0', '1' %},{% cycle \"0\" ,\"1\" %}.{% endfor %}");
    assert_eq!(result, "0,1.0,1.0,1.");
}

#[test]
fn cycle_string_and_integer_values_are_separate_groups() {
    let result = render("{% for a in array %}{% cycle '0', '1' %},{% cycle 0, 1 %}.{% endfor %}");
    assert_eq!(result, "0,0.1,1.0,0.");
}

#[test]
fn cycle_named_group_is_independent() {
    let result = render(
        "{% for a in array %}{% cycle group: '0', '1' %},{% cycle '0', '1' %}.{% endfor %}",
    );
    assert_eq!(result, "0,0.1,1.0,0.");
}

#[test]
fn cycle_resets_per_loop_invocation() {
    let result = render(
        "{% for i in (1..2) %}{% for a in array %}{% cycle 'x', 'y' %}{% endfor %};{% endfor %}",
    );
    assert_eq!(result, "xyx;xyx;");
}

#[test]
fn cycle_values_are_expressions() {
    let result = render("{% for a in array %}{% cycle a, 1 %}{% endfor %}");
    assert_eq!(result, "first1third");
}

#[test]
fn tablerow_single_row() {
    let result = render("{% tablerow product in products %}{{ product }}{% endtablerow %}");
    assert_eq!(
        result,
        concat!(
            r#"<tr class="row1"><td class="col1">Cool Shirt</td>"#,
            r#"<td class="col2">Alien Poster</td>"#,
            r#"<td class="col3">Batman Poster</td>"#,
            r#"<td class="col4">Bullseye Shirt</td>"#,
            r#"<td class="col5">Another Classic Vinyl</td>"#,
            r#"<td class="col6">Awesome Jeans</td></tr>"#,
        )
    );
}

#[test]
fn tablerow_cols() {
    let result = render("{% tablerow product in products cols:2 %}{{ product }}{% endtablerow %}");
    assert_eq!(
        result,
        r#"<tr class="row1"><td class="col1">Cool Shirt</td><td class="col2">Alien Poster</td></tr>
<tr class="row2"><td class="col1">Batman Poster</td><td class="col2">Bullseye Shirt</td></tr>
<tr class="row3"><td class="col1">Another Classic Vinyl</td><td class="col2">Awesome Jeans</td></tr>"#
    );
}

#[test]
fn tablerow_forloop_columns() {
    let result = render(
        "{% tablerow p in products cols:4 limit:5 %}{{ forloop.row }}{{ forloop.col }}{% if forloop.col_last %}!{% endif %}{% endtablerow %}",
    );
    assert_eq!(
        result,
        r#"<tr class="row1"><td class="col1">11</td><td class="col2">12</td><td class="col3">13</td><td class="col4">14!</td></tr>
<tr class="row2"><td class="col1">21!</td></tr>"#
    );
}

#[test]
fn tablerow_empty() {
    assert_eq!(render("{% tablerow p in missing %}x{% endtablerow %}"), "");
}

#[test]
fn tablerow_break_closes_row() {
    let result = render(
        "{% tablerow p in products cols:2 %}{% if forloop.index == 3 %}{% break %}{% endif %}{{ forloop.index }}{% endtablerow %}",
    );
    assert_eq!(
        result,
        r#"<tr class="row1"><td class="col1">1</td><td class="col2">2</td></tr>
<tr class="row2"><td class="col1"></td></tr>"#
    );
}

#[test]
fn control_err_outside_loop() {
    let cases = [
        ("{% break %}", "break outside a loop"),
        ("{% continue %}", "continue outside a loop"),
        ("{% if true %}{% break %}{% endif %}", "break outside a loop"),
    ];
    for (source, msg) in cases {
        let err = render_err(source);
        assert_eq!(err.kind(), ErrorKind::Control);
        assert_eq!(err.to_string(), msg);
    }
}

#[test]
fn control_err_cycle_outside_loop() {
    let err = render_err("{% cycle 'a', 'b' %}");
    assert_eq!(err.kind(), ErrorKind::Control);
    assert_eq!(
        err.to_string(),
        "cycle must be within a forloop between bytes 9 and 17"
    );
}

#[test]
fn loop_err_syntax() {
    let cases = [
        ("{% for a b c %}{% endfor %}", "syntax error"),
        ("{% for a in array offset %}{% endfor %}", "undefined loop modifier \"offset\""),
        ("{% for a in array sorted %}{% endfor %}", "undefined loop modifier \"sorted\""),
        ("{% cycle %}", "syntax error"),
    ];
    for (source, msg) in cases {
        let err = Engine::new().compile(source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains(msg), "{source}: {err}");
    }
}
