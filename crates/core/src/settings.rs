//! Typed application settings.
//!
//! Settings are stored as text; the declared type decides how the value is
//! validated on write and decoded on read.

use serde_json::Value;

use crate::error::CoreError;

define_text_enum! {
    SettingType ("setting type") {
        String = ("string", "Texto"),
        Integer = ("integer", "Número entero"),
        Boolean = ("boolean", "Sí/No"),
        Json = ("json", "JSON"),
    }
}

define_text_enum! {
    SettingGroup ("setting group") {
        General = ("general", "General"),
        Email = ("email", "Correo electrónico"),
        Rgpd = ("rgpd", "RGPD"),
        Media = ("media", "Multimedia"),
        Seo = ("seo", "SEO"),
    }
}

/// Decode a stored value according to its type.
pub fn decode_value(setting_type: SettingType, raw: &str) -> Result<Value, CoreError> {
    let bad = || {
        CoreError::Validation(format!(
            "Value '{raw}' is not a valid {}",
            setting_type.as_str()
        ))
    };
    match setting_type {
        SettingType::String => Ok(Value::String(raw.to_string())),
        SettingType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| bad()),
        SettingType::Boolean => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Value::Bool(false)),
            _ => Err(bad()),
        },
        SettingType::Json => serde_json::from_str(raw).map_err(|_| bad()),
    }
}

/// Encode an incoming JSON value as stored text, checking it matches the
/// setting's type.
pub fn encode_value(setting_type: SettingType, value: &Value) -> Result<String, CoreError> {
    let mismatch = || {
        CoreError::Validation(format!(
            "Expected a {} value for this setting",
            setting_type.as_str()
        ))
    };
    match (setting_type, value) {
        (SettingType::String, Value::String(s)) => Ok(s.clone()),
        (SettingType::Integer, Value::Number(n)) if n.is_i64() => Ok(n.to_string()),
        (SettingType::Integer, Value::String(s)) => {
            s.trim().parse::<i64>().map(|n| n.to_string()).map_err(|_| mismatch())
        }
        (SettingType::Boolean, Value::Bool(b)) => Ok(if *b { "1" } else { "0" }.to_string()),
        (SettingType::Json, v) => Ok(v.to_string()),
        _ => Err(mismatch()),
    }
}
