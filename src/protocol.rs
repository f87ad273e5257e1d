use serde::{Deserialize, Serialize};

/// Shared shape of every response body: a `success` flag plus an `error`
/// message that is empty on success.
pub trait Envelope {
    fn success(&self) -> bool;
    fn error(&self) -> &str;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleResponse {
    pub success: bool,
    pub error: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: "".to_string(),
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        error: err.to_string(),
                        ..Default::default()
                    }
                }
            }

            impl $crate::protocol::Envelope for $type {
                fn success(&self) -> bool {
                    self.success
                }

                fn error(&self) -> &str {
                    &self.error
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}
