//! Round-trip behavior of deferred-value properties through the document
//! codec, including serde-transparent use inside a host document struct.

use exprbind::{
    ArrayProperty, BoolProperty, Codec, DeferredValue, EnumProperty, IntProperty, NumberProperty,
    StringProperty, ValueProperty,
};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum InputMode {
    Interruptible,
    Consume,
}

/// A configuration object the way a document loader would declare one.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptStep {
    #[serde(default)]
    prompt: StringProperty,
    #[serde(default)]
    max_turns: IntProperty,
    #[serde(default)]
    temperature: NumberProperty,
    #[serde(default)]
    always_prompt: BoolProperty,
    #[serde(default)]
    input_mode: EnumProperty<InputMode>,
    #[serde(default)]
    choices: ArrayProperty<String>,
    #[serde(default)]
    default_value: ValueProperty,
}

#[test]
fn document_load_makes_the_decision_per_field() {
    let doc = json!({
        "prompt": "What is your name?",
        "maxTurns": "=settings.maxTurns",
        "temperature": 0.7,
        "alwaysPrompt": true,
        "inputMode": "\\=consume",
        "choices": ["red", "green"],
        "defaultValue": {"anything": ["goes", 1]}
    });

    let step: PromptStep = serde_json::from_value(doc).unwrap();

    // Plain strings become quoted template expressions.
    assert_eq!(
        step.prompt,
        StringProperty::Expression("=`What is your name?`".to_string())
    );
    // '='-prefixed strings stay raw expressions, for any target type.
    assert_eq!(
        step.max_turns,
        IntProperty::Expression("=settings.maxTurns".to_string())
    );
    // Non-string tokens are literals and never expressions.
    assert_eq!(step.temperature, NumberProperty::Literal(0.7));
    assert_eq!(step.always_prompt, BoolProperty::Literal(true));
    assert_eq!(
        step.choices,
        ArrayProperty::Literal(vec!["red".to_string(), "green".to_string()])
    );
    assert_eq!(
        step.default_value,
        ValueProperty::Literal(json!({"anything": ["goes", 1]}))
    );
    // Escaped '=' keeps the equals sign as text inside the quoting.
    assert_eq!(
        step.input_mode,
        EnumProperty::Expression("=`=consume`".to_string())
    );
}

#[test]
fn absent_fields_load_as_unset_and_write_back_null() {
    let step: PromptStep = serde_json::from_value(json!({})).unwrap();
    assert!(step.prompt.is_empty());
    assert!(step.default_value.is_empty());

    let codec = Codec::<String>::new();
    assert_eq!(codec.write(&step.prompt).unwrap(), Value::Null);
}

#[test]
fn serde_round_trip_stabilizes_after_one_generation() {
    let doc = json!({
        "prompt": "hello",
        "maxTurns": "=a.b",
        "temperature": 0.5,
        "choices": ["x"]
    });

    let first: PromptStep = serde_json::from_value(doc).unwrap();
    let written = serde_json::to_value(&first).unwrap();
    let second: PromptStep = serde_json::from_value(written.clone()).unwrap();

    // From the second generation onward the document text is a fixed point.
    assert_eq!(second, first);
    assert_eq!(serde_json::to_value(&second).unwrap(), written);
    assert_eq!(written.get("prompt"), Some(&json!("=`hello`")));
    assert_eq!(written.get("maxTurns"), Some(&json!("=a.b")));
}

#[test]
fn literal_decode_encode_is_identity_for_non_string_shapes() {
    let bool_codec = Codec::<bool>::new();
    let int_codec = Codec::<i64>::new();
    let array_codec = Codec::<Vec<i64>>::new();

    for (token, codec_result) in [
        (json!(false), bool_codec.write(&bool_codec.read(&json!(false)).unwrap()).unwrap()),
        (json!(41), int_codec.write(&int_codec.read(&json!(41)).unwrap()).unwrap()),
        (
            json!([1, 2]),
            array_codec.write(&array_codec.read(&json!([1, 2])).unwrap()).unwrap(),
        ),
    ] {
        assert_eq!(codec_result, token);
    }
}

#[test]
fn resolved_literal_write_back_re_establishes_the_invariant() {
    // The evaluator may rewrite an expression into its resolved literal;
    // the property must then serialize as a plain document node.
    let mut prop = DeferredValue::<i64>::from_raw_str("=settings.maxTurns");
    prop.set_value(exprbind::RawValue::Typed(3));

    assert_eq!(prop.expression_text(), None);
    let codec = Codec::<i64>::new();
    assert_eq!(codec.write(&prop).unwrap(), json!(3));
}
