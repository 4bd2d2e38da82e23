use std::fmt;

use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    NoWindow,
    NoDocument,
    ContainerNotFound(String),
    ContextUnavailable,
    Config(String),
    Js(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoWindow => write!(f, "no global window"),
            Error::NoDocument => write!(f, "window has no document"),
            Error::ContainerNotFound(id) => write!(f, "no element with id '{}'", id),
            Error::ContextUnavailable => write!(f, "2d canvas context unavailable"),
            Error::Config(msg) => write!(f, "invalid particle config: {}", msg),
            Error::Js(msg) => write!(f, "javascript error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
