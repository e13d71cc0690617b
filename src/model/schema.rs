use serde::Serialize;
use serde_json::{Value, json};

use super::params::{get_number, get_text};
use super::{Params, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamKind {
    Number {
        min: f64,
        max: f64,
    },
    Integer {
        min: f64,
        max: f64,
    },
    Choice {
        allowed: &'static [&'static str],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    Number(f64),
    Text(&'static str),
}

impl ParamDefault {
    fn to_value(self) -> Value {
        match self {
            Self::Number(number) => json!(number),
            Self::Text(text) => json!(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub kind: ParamKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamDefault>,
}

impl ParamSpec {
    pub(crate) const fn number(
        name: &'static str,
        description: &'static str,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            description,
            required: true,
            kind: ParamKind::Number { min, max },
            default: None,
        }
    }

    pub(crate) const fn integer(
        name: &'static str,
        description: &'static str,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            description,
            required: true,
            kind: ParamKind::Integer { min, max },
            default: None,
        }
    }

    pub(crate) const fn choice(
        name: &'static str,
        description: &'static str,
        allowed: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            description,
            required: true,
            kind: ParamKind::Choice { allowed },
            default: None,
        }
    }

    pub(crate) const fn or_number(mut self, default: f64) -> Self {
        self.required = false;
        self.default = Some(ParamDefault::Number(default));
        self
    }

    pub(crate) const fn or_text(mut self, default: &'static str) -> Self {
        self.required = false;
        self.default = Some(ParamDefault::Text(default));
        self
    }

    fn check(&self, params: &Params) -> Result<Option<Value>> {
        match self.kind {
            ParamKind::Number { min, max } | ParamKind::Integer { min, max } => {
                let Some(value) = get_number(params, self.name)? else {
                    return Ok(None);
                };
                if value < min || value > max {
                    return Err(ValidationError::OutOfRange {
                        param: self.name.to_string(),
                        value,
                        min,
                        max,
                    });
                }
                if matches!(self.kind, ParamKind::Integer { .. }) {
                    if value.fract() != 0.0 {
                        return Err(ValidationError::WrongType {
                            param: self.name.to_string(),
                            expected: "an integer",
                        });
                    }
                    return Ok(Some(json!(value as i64)));
                }
                Ok(Some(json!(value)))
            }
            ParamKind::Choice { allowed } => {
                let Some(value) = get_text(params, self.name)? else {
                    return Ok(None);
                };
                if !allowed.contains(&value) {
                    return Err(ValidationError::InvalidChoice {
                        param: self.name.to_string(),
                        value: value.to_string(),
                        allowed,
                    });
                }
                Ok(Some(json!(value)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl OpSchema {
    /// Checks every parameter against its spec and fills in defaults.
    pub fn validate(&self, params: &Params) -> Result<Params> {
        if let Some(unknown) = params
            .keys()
            .find(|key| !self.params.iter().any(|spec| spec.name == key.as_str()))
        {
            return Err(ValidationError::UnknownParam {
                operation: self.name,
                param: unknown.clone(),
            });
        }

        let mut checked = Params::new();
        for spec in &self.params {
            match spec.check(params)? {
                Some(value) => {
                    checked.insert(spec.name.to_string(), value);
                }
                None => match spec.default {
                    Some(ParamDefault::Number(number))
                        if matches!(spec.kind, ParamKind::Integer { .. }) =>
                    {
                        checked.insert(spec.name.to_string(), json!(number as i64));
                    }
                    Some(default) => {
                        checked.insert(spec.name.to_string(), default.to_value());
                    }
                    None if spec.required => {
                        return Err(ValidationError::MissingParam {
                            operation: self.name,
                            param: spec.name.to_string(),
                        });
                    }
                    None => {}
                },
            }
        }
        Ok(checked)
    }
}
