use super::*;

#[test]
fn navigation_runs_before_later_keydown_listeners() -> Result<()> {
    let html = r#"
    <form id='f'>
      <input id='a'>
      <input id='b'>
    </form>
    "#;
    let mut h = Harness::from_html(html)?;
    h.listen("#a", "keydown")?;
    h.listen("#a", "keyup")?;
    h.listen("#b", "keyup")?;
    h.listen("#b", "focus")?;
    h.listen("#a", "blur")?;

    h.press_enter("#a")?;

    assert_eq!(
        h.take_event_log(),
        vec!["blur:a", "focus:b", "keydown:a:Enter", "keyup:b:Enter"]
    );
    Ok(())
}

#[test]
fn form_level_listeners_see_bubbling_key_events() -> Result<()> {
    let html = r#"
    <form id='f'>
      <input id='a'>
      <input id='b'>
    </form>
    "#;
    let mut h = Harness::from_html(html)?;
    h.listen("#f", "keydown")?;
    h.press_key("#b", "z")?;
    h.press_enter("#a")?;

    assert_eq!(h.event_log(), &["keydown:b:z", "keydown:a:Enter"]);
    Ok(())
}

#[test]
fn cancelled_keydown_skips_the_key_default() -> Result<()> {
    let html = "<form><input id='a'><input id='b'></form>";
    let mut h = Harness::from_html(html)?;
    h.prevent_default("#a", "keydown")?;

    h.press_key("#a", "q")?;
    h.assert_value("#a", "")?;

    h.press_enter("#a")?;
    h.assert_focused("#b")?;
    Ok(())
}

#[test]
fn duplicate_listeners_are_registered_once() -> Result<()> {
    let mut h = Harness::from_html("<form><input id='a'></form>")?;
    h.listen("#a", "input")?;
    h.listen("#a", "input")?;
    h.type_text("#a", "hi")?;
    assert_eq!(h.event_log(), &["input:a"]);
    Ok(())
}

#[test]
fn focus_and_blur_dispatch_focus_events() -> Result<()> {
    let mut h = Harness::from_html("<input id='a'><input id='b'>")?;
    for event in ["focus", "focusin", "blur", "focusout"] {
        h.listen("#a", event)?;
    }

    h.focus("#a")?;
    h.focus("#a")?;
    h.assert_focused("#a")?;
    h.blur("#a")?;
    h.assert_no_focus()?;

    assert_eq!(
        h.take_event_log(),
        vec!["focusin:a", "focus:a", "focusout:a", "blur:a"]
    );
    Ok(())
}

#[test]
fn non_focusable_elements_do_not_take_focus() -> Result<()> {
    let html = r#"
    <div id='plain'>text</div>
    <a id='link' href='/x'>x</a>
    <span id='tab' tabindex='0'>t</span>
    <input id='secret' type='hidden'>
    <input id='off' disabled>
    "#;
    let mut h = Harness::from_html(html)?;

    h.focus("#plain")?;
    h.assert_no_focus()?;
    h.focus("#secret")?;
    h.assert_no_focus()?;
    h.focus("#off")?;
    h.assert_no_focus()?;

    h.focus("#link")?;
    h.assert_focused("#link")?;
    h.focus("#tab")?;
    h.assert_focused("#tab")?;
    Ok(())
}

#[test]
fn disabling_the_focused_field_blurs_it() -> Result<()> {
    let mut h = Harness::from_html("<form><input id='a'></form>")?;
    h.focus("#a")?;
    h.set_disabled("#a", true)?;
    h.assert_no_focus()?;
    assert!(h.dom().disabled(h.select_one("#a")?));
    assert_eq!(h.dump_dom("#a")?, "<input id=\"a\" disabled=\"\">");
    Ok(())
}

#[test]
fn pressing_keys_on_disabled_fields_does_nothing() -> Result<()> {
    let mut h = Harness::from_html("<form><input id='a' disabled></form>")?;
    h.listen("#a", "keydown")?;
    h.press_enter("#a")?;
    h.assert_no_focus()?;
    assert!(h.event_log().is_empty());
    Ok(())
}

#[test]
fn clicking_checkboxes_and_radios_toggles_state() -> Result<()> {
    let html = r#"
    <form>
      <input id='c' type='checkbox'>
      <input id='r1' type='radio' name='size' checked>
      <input id='r2' type='radio' name='size'>
    </form>
    "#;
    let mut h = Harness::from_html(html)?;
    h.listen("#c", "change")?;

    h.click("#c")?;
    h.assert_checked("#c", true)?;
    h.click("#c")?;
    h.assert_checked("#c", false)?;

    h.click("#r2")?;
    h.assert_checked("#r2", true)?;
    h.assert_checked("#r1", false)?;

    h.set_checked("#r1", true)?;
    h.assert_checked("#r2", false)?;

    assert_eq!(h.event_log(), &["change:c", "change:c"]);
    Ok(())
}

#[test]
fn set_checked_rejects_non_toggle_inputs() -> Result<()> {
    let mut h = Harness::from_html("<input id='t'>")?;
    match h.set_checked("#t", true) {
        Err(Error::TypeMismatch { actual, .. }) => assert_eq!(actual, "input[type=text]"),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn type_text_rejects_non_text_elements() -> Result<()> {
    let mut h = Harness::from_html("<select id='s'><option>a</option></select>")?;
    match h.type_text("#s", "x") {
        Err(Error::TypeMismatch { expected, actual, .. }) => {
            assert_eq!(expected, "input or textarea");
            assert_eq!(actual, "select");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_selectors_report_not_found() -> Result<()> {
    let mut h = Harness::from_html("<form><input id='a'></form>")?;
    assert_eq!(
        h.press_enter("#nope"),
        Err(Error::SelectorNotFound("#nope".into()))
    );
    Ok(())
}

#[test]
fn assertion_failures_carry_a_dom_snippet() -> Result<()> {
    let mut h = Harness::from_html("<form><input id='a'><input id='b'></form>")?;
    h.focus("#a")?;
    match h.assert_focused("#b") {
        Err(Error::AssertionFailed {
            expected,
            actual,
            dom_snippet,
            ..
        }) => {
            assert_eq!(expected, "focus on #b");
            assert_eq!(actual, "focus on #a");
            assert_eq!(dom_snippet, "<input id=\"b\">");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(h.assert_no_focus().is_err());
    Ok(())
}
