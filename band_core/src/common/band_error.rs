use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error codes for the band estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Common errors (0-99)
    #[strum(serialize = "_COMMON_ERR_BEGIN")]
    CommonErrBegin = 0,
    #[strum(serialize = "COMMON_ERROR")]
    CommonError = 1,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 5,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 17,
    #[strum(serialize = "SRC_DATA_FORMAT_ERROR")]
    SrcDataFormatError = 18,
    #[strum(serialize = "_COMMON_ERR_END")]
    CommonErrEnd = 99,

    // Model errors (100-199)
    #[strum(serialize = "_MODEL_ERR_BEGIN")]
    ModelErrBegin = 100,
    #[strum(serialize = "INSUFFICIENT_DATA")]
    InsufficientData = 101,
    #[strum(serialize = "FIT_FAILURE")]
    FitFailure = 102,
    #[strum(serialize = "MISSING_REFERENCE")]
    MissingReference = 103,
    #[strum(serialize = "_MODEL_ERR_END")]
    ModelErrEnd = 199,

    // KL data errors (200-299)
    #[strum(serialize = "_KL_ERR_BEGIN")]
    KlErrBegin = 200,
    #[strum(serialize = "PRICE_BELOW_ZERO")]
    PriceBelowZero = 201,
    #[strum(serialize = "KL_DATA_INVALID")]
    KlDataInvalid = 203,
    #[strum(serialize = "KL_NOT_MONOTONOUS")]
    KlNotMonotonous = 206,
    #[strum(serialize = "EMPTY_INPUT")]
    EmptyInput = 210,
    #[strum(serialize = "_KL_ERR_END")]
    KlErrEnd = 299,
}

impl ErrCode {
    pub fn is_kldata_err(&self) -> bool {
        let code = *self as i32;
        code > Self::KlErrBegin as i32 && code < Self::KlErrEnd as i32
    }

    pub fn is_model_err(&self) -> bool {
        let code = *self as i32;
        code > Self::ModelErrBegin as i32 && code < Self::ModelErrEnd as i32
    }
}

#[derive(Debug, Clone, Error)]
#[error("{errcode}: {msg}")]
pub struct BandError {
    pub errcode: ErrCode,
    pub msg: String,
}

impl BandError {
    pub fn new(message: impl Into<String>, code: ErrCode) -> Self {
        Self {
            errcode: code,
            msg: message.into(),
        }
    }

    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::EmptyInput)
    }

    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::new(
            format!("need at least {} observations, got {}", required, actual),
            ErrCode::InsufficientData,
        )
    }

    pub fn fit_failure(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::FitFailure)
    }

    pub fn is_kldata_err(&self) -> bool {
        self.errcode.is_kldata_err()
    }

    pub fn is_model_err(&self) -> bool {
        self.errcode.is_model_err()
    }
}
