use serde_json::{Map, Value};

use super::{Result, ValidationError};

pub type Params = Map<String, Value>;

pub(crate) fn get_number(params: &Params, key: &str) -> Result<Option<f64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| ValidationError::NotFinite {
                param: key.to_string(),
            }),
        Some(_) => Err(ValidationError::WrongType {
            param: key.to_string(),
            expected: "a number",
        }),
    }
}

pub(crate) fn get_text<'a>(params: &'a Params, key: &str) -> Result<Option<&'a str>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(ValidationError::WrongType {
            param: key.to_string(),
            expected: "a string",
        }),
    }
}

/// Parses `key=value` pairs. Values that read as numbers become numbers.
pub fn parse_param_pairs<I, S>(pairs: I) -> Result<Params>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = Params::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, raw) = pair.split_once('=').ok_or_else(|| ValidationError::WrongType {
            param: pair.to_string(),
            expected: "written as `key=value`",
        })?;
        let value = match raw.trim().parse::<f64>() {
            Ok(number) if !number.is_finite() => {
                return Err(ValidationError::NotFinite {
                    param: key.trim().to_string(),
                });
            }
            Ok(number) => serde_json::Number::from_f64(number)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Err(_) => Value::String(raw.trim().to_string()),
        };
        params.insert(key.trim().to_string(), value);
    }
    Ok(params)
}
