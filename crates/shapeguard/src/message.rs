//! Message template rendering

use crate::traits::ValidationArguments;

/// Render a constraint argument the way it appears in messages
pub fn constraint_to_string(argument: &serde_json::Value) -> String {
    match argument {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.is_finite() => format!("{}", f as i64),
            _ => n.to_string(),
        },
        serde_json::Value::Array(items) => items
            .iter()
            .map(constraint_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Substitute `$constraintN`, `$value`, `$property` and `$target` tokens
pub fn replace_tokens(template: &str, args: &ValidationArguments) -> String {
    let mut message = template.to_string();

    for (index, argument) in args.constraints.iter().enumerate().rev() {
        let token = format!("$constraint{}", index + 1);
        message = message.replace(&token, &constraint_to_string(argument));
    }

    if message.contains("$value") {
        message = message.replace("$value", &args.value.to_string());
    }
    message
        .replace("$property", &args.property)
        .replace("$target", &args.target_name)
}
