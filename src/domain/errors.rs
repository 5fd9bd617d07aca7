use derive_more::Display;

/// Series shape violations found while loading data
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ValidationError {
    #[display(fmt = "series has no bars")]
    EmptySeries,
    #[display(fmt = "bar {} time {} is not after previous time {}", index, time, previous)]
    NonIncreasingTime { index: usize, previous: i64, time: i64 },
    #[display(fmt = "bar {} has a non-finite close price", index)]
    NonFinitePrice { index: usize },
    #[display(fmt = "resolution must be positive, got {}", _0)]
    InvalidResolution(i64),
    #[display(fmt = "malformed series payload: {}", _0)]
    MalformedPayload(String),
}

/// Transient coordinate lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum GeometryError {
    #[display(fmt = "{} is not a finite coordinate", _0)]
    NonFinite(&'static str),
    #[display(fmt = "chart has no visible range yet")]
    ChartNotReady,
    #[display(fmt = "no bar under the pointer")]
    NoBarUnderCursor,
    #[display(fmt = "no series loaded")]
    NoSeries,
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum DomainError {
    #[display(fmt = "validation: {}", _0)]
    Validation(ValidationError),
    #[display(fmt = "geometry: {}", _0)]
    Geometry(GeometryError),
}

/// Root error type surfaced at the JavaScript boundary
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Domain Error: {}", _0)]
    Domain(DomainError),
    #[display(fmt = "Configuration Error: {}", _0)]
    Configuration(String),
    #[display(fmt = "Browser API Error: {}", _0)]
    BrowserApi(String),
}

impl std::error::Error for ValidationError {}
impl std::error::Error for GeometryError {}
impl std::error::Error for DomainError {}
impl std::error::Error for AppError {}

impl From<ValidationError> for DomainError {
    fn from(error: ValidationError) -> Self {
        DomainError::Validation(error)
    }
}

impl From<GeometryError> for DomainError {
    fn from(error: GeometryError) -> Self {
        DomainError::Geometry(error)
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        AppError::Domain(error)
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::Domain(DomainError::Validation(error))
    }
}

impl From<AppError> for wasm_bindgen::JsValue {
    fn from(error: AppError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

pub type AppResult<T> = Result<T, AppError>;
