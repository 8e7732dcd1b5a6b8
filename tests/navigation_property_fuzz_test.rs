use form_navigator::Harness;
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const NAVIGATION_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/navigation_property_fuzz_test.txt";
const DEFAULT_NAVIGATION_PROPTEST_CASES: u32 = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControlKind {
    Text,
    Email,
    Password,
    Select,
    Textarea,
    Checkbox,
    Submit,
    InputButton,
    DefaultButton,
    PlainButton,
    Disabled,
}

impl ControlKind {
    fn markup(self, index: usize) -> String {
        let id = format!("c{index}");
        let name = format!("n{index}");
        match self {
            Self::Text => format!("<input id='{id}' name='{name}'>"),
            Self::Email => format!("<input id='{id}' name='{name}' type='email'>"),
            Self::Password => format!("<input id='{id}' name='{name}' type='password'>"),
            Self::Select => format!(
                "<select id='{id}' name='{name}'><option value='x'>X</option><option>Y</option></select>"
            ),
            Self::Textarea => format!("<textarea id='{id}' name='{name}'></textarea>"),
            Self::Checkbox => format!("<input id='{id}' name='{name}' type='checkbox'>"),
            Self::Submit => format!("<input id='{id}' type='submit' value='Send'>"),
            Self::InputButton => format!("<input id='{id}' type='button' value='Run'>"),
            Self::DefaultButton => format!("<button id='{id}'>Go</button>"),
            Self::PlainButton => format!("<button id='{id}' type='button'>Noop</button>"),
            Self::Disabled => format!("<input id='{id}' name='{name}' disabled>"),
        }
    }

    fn is_eligible(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Email
                | Self::Password
                | Self::Select
                | Self::Textarea
                | Self::Checkbox
        )
    }

    fn accepts_characters(self) -> bool {
        matches!(self, Self::Text | Self::Email | Self::Password | Self::Textarea)
    }

    fn submits_on_activation(self) -> bool {
        matches!(self, Self::Submit | Self::DefaultButton)
    }
}

#[derive(Clone, Debug)]
enum KeyAction {
    Enter(usize),
    Char(usize, char),
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn navigation_proptest_cases() -> u32 {
    env_proptest_cases(
        "FORM_NAVIGATOR_PROPTEST_CASES",
        DEFAULT_NAVIGATION_PROPTEST_CASES,
    )
}

fn control_kind_strategy() -> BoxedStrategy<ControlKind> {
    prop_oneof![
        4 => Just(ControlKind::Text),
        1 => Just(ControlKind::Email),
        1 => Just(ControlKind::Password),
        2 => Just(ControlKind::Select),
        2 => Just(ControlKind::Textarea),
        2 => Just(ControlKind::Checkbox),
        1 => Just(ControlKind::Submit),
        1 => Just(ControlKind::InputButton),
        1 => Just(ControlKind::DefaultButton),
        1 => Just(ControlKind::PlainButton),
        2 => Just(ControlKind::Disabled),
    ]
    .boxed()
}

fn key_action_strategy(len: usize) -> BoxedStrategy<KeyAction> {
    prop_oneof![
        3 => (0..len).prop_map(KeyAction::Enter),
        1 => (0..len, prop_oneof![Just('a'), Just('z'), Just('0'), Just(' ')])
            .prop_map(|(index, ch)| KeyAction::Char(index, ch)),
    ]
    .boxed()
}

fn scenario_strategy() -> BoxedStrategy<(Vec<ControlKind>, Vec<KeyAction>)> {
    vec(control_kind_strategy(), 1..=10)
        .prop_flat_map(|kinds| {
            let len = kinds.len();
            (Just(kinds), vec(key_action_strategy(len), 1..=24))
        })
        .boxed()
}

fn form_html(kinds: &[ControlKind]) -> String {
    let controls = kinds
        .iter()
        .enumerate()
        .map(|(index, kind)| kind.markup(index))
        .collect::<Vec<_>>()
        .join("\n  ");
    format!("<form id='f'>\n  {controls}\n</form>")
}

fn fail(err: form_navigator::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

// Drives the page and a plain model side by side and compares focus, typed
// values and the submission count after every key press.
fn assert_enter_follows_field_order(kinds: &[ControlKind], actions: &[KeyAction]) -> TestCaseResult {
    let mut harness = Harness::from_html(&form_html(kinds)).map_err(fail)?;

    let eligible = kinds
        .iter()
        .enumerate()
        .filter(|(_, kind)| kind.is_eligible())
        .map(|(index, _)| index)
        .collect::<Vec<_>>();
    let expected_sequence = eligible
        .iter()
        .map(|index| format!("#c{index}"))
        .collect::<Vec<_>>();
    prop_assert_eq!(harness.field_sequence("#f").map_err(fail)?, expected_sequence);

    let mut focused: Option<usize> = None;
    let mut values = vec![String::new(); kinds.len()];
    let mut submissions = 0usize;

    for (step, action) in actions.iter().enumerate() {
        match action {
            KeyAction::Enter(index) => {
                harness.press_enter(&format!("#c{index}")).map_err(fail)?;
                let kind = kinds[*index];
                if kind != ControlKind::Disabled {
                    focused = Some(*index);
                }
                if let Some(position) = eligible.iter().position(|field| field == index) {
                    if let Some(next) = eligible.get(position + 1) {
                        focused = Some(*next);
                    }
                } else if kind.submits_on_activation() {
                    submissions += 1;
                }
            }
            KeyAction::Char(index, ch) => {
                harness
                    .press_key(&format!("#c{index}"), &ch.to_string())
                    .map_err(fail)?;
                let kind = kinds[*index];
                if kind != ControlKind::Disabled {
                    focused = Some(*index);
                }
                if kind.accepts_characters() {
                    values[*index].push(*ch);
                }
            }
        }

        let expected_focus = focused.map(|index| format!("#c{index}"));
        prop_assert_eq!(
            harness.active_element(),
            expected_focus,
            "focus mismatch after step {} ({:?}) in {:?}",
            step,
            action,
            kinds
        );
        prop_assert_eq!(
            harness.submissions().len(),
            submissions,
            "submission count mismatch after step {} ({:?}) in {:?}",
            step,
            action,
            kinds
        );
    }

    for (index, kind) in kinds.iter().enumerate() {
        if kind.accepts_characters() {
            prop_assert!(
                harness
                    .assert_value(&format!("#c{index}"), &values[index])
                    .is_ok(),
                "value mismatch for #c{index} after {actions:?}"
            );
        }
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: navigation_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(NAVIGATION_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn enter_follows_field_order_and_never_submits_from_fields(
        (kinds, actions) in scenario_strategy()
    ) {
        assert_enter_follows_field_order(&kinds, &actions)?;
    }
}
