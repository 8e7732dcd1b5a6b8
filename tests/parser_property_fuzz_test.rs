use form_navigator::Harness;
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;

fn fragment_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("<form>"),
        Just("</form>"),
        Just("<form id='f'>"),
        Just("<input>"),
        Just("<input id='a' disabled>"),
        Just("<input type='submit'>"),
        Just("<input type=button value=x/>"),
        Just("<select><option>1<option selected>2</select>"),
        Just("<select>"),
        Just("<option>"),
        Just("<textarea>\nhi</textarea>"),
        Just("<button>go</button>"),
        Just("<fieldset disabled>"),
        Just("</fieldset>"),
        Just("<div class='row'>"),
        Just("</div>"),
        Just("</span>"),
        Just("<!-- note -->"),
        Just("<!DOCTYPE html>"),
        Just("text"),
        Just(" < "),
        Just("&amp;&#x41;&bogus;"),
        Just("<br/>"),
    ]
    .prop_map(str::to_string)
    .boxed()
}

fn document_strategy() -> BoxedStrategy<String> {
    vec(fragment_strategy(), 0..=24)
        .prop_map(|parts| parts.concat())
        .boxed()
}

fn assert_loading_never_panics(html: &str) -> TestCaseResult {
    let outcome = std::panic::catch_unwind(|| {
        let mut harness = Harness::from_html(html)?;
        let forms = harness.dom().query_selector_all("form")?;
        let sequences = harness.navigator().map(|navigator| navigator.forms().len());
        if sequences != Some(forms.len()) {
            return Ok(false);
        }
        if harness.dom().query_selector("input")?.is_some() {
            harness.press_enter("input")?;
        }
        Ok::<bool, form_navigator::Error>(true)
    });
    match outcome {
        Err(_) => {
            prop_assert!(false, "loading panicked for:\n{html}");
        }
        Ok(Err(err)) => {
            prop_assert!(false, "loading failed with {err:?} for:\n{html}");
        }
        Ok(Ok(consistent)) => {
            prop_assert!(
                consistent,
                "navigator form count differs from the DOM for:\n{html}"
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn generated_form_markup_loads_without_panicking(html in document_strategy()) {
        assert_loading_never_panics(&html)?;
    }
}
