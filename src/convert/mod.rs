// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed boundary of [`Flow::run`](crate::engine::Flow::run).
//!
//! Inside a flow everything is bytes. These traits decide how a caller's
//! value becomes the input stream and how the collected output bytes become
//! the caller's result type.
//!
//! | Input                 | Encoding                          |
//! |-----------------------|-----------------------------------|
//! | `String`, `&str`      | UTF-8 bytes                       |
//! | `Vec<u8>`, `&[u8]`    | as is                             |
//! | [`Stream<R>`]         | streamed from `R` without copying |
//! | [`Json<T>`]           | `serde_json` serialization of `T` |

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Cursor;
use tokio::io::AsyncRead;

use crate::engine::ByteReader;
use crate::errors::FlowError;

/// Boxed byte stream feeding the first stage.
pub type ByteSource = Box<dyn AsyncRead + Send + Unpin>;

pub trait IntoByteSource {
    fn into_byte_source(self) -> Result<ByteSource, FlowError>;
}

pub trait FromByteOutput: Sized {
    fn from_byte_output(bytes: Vec<u8>) -> Result<Self, FlowError>;
}

/// Wraps any async reader so it is streamed into the flow as is.
#[derive(Debug)]
pub struct Stream<R>(pub R);

/// Serializes on the way in, deserializes on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

fn buffered(bytes: Vec<u8>) -> ByteSource {
    Box::new(Cursor::new(bytes))
}

impl IntoByteSource for Vec<u8> {
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        Ok(buffered(self))
    }
}

impl IntoByteSource for &[u8] {
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        Ok(buffered(self.to_vec()))
    }
}

impl IntoByteSource for String {
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        Ok(buffered(self.into_bytes()))
    }
}

impl IntoByteSource for &str {
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        Ok(buffered(self.as_bytes().to_vec()))
    }
}

impl IntoByteSource for ByteReader {
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        Ok(Box::new(self))
    }
}

impl<R> IntoByteSource for Stream<R>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        Ok(Box::new(self.0))
    }
}

impl<T: Serialize> IntoByteSource for Json<T> {
    fn into_byte_source(self) -> Result<ByteSource, FlowError> {
        serde_json::to_vec(&self.0)
            .map(buffered)
            .map_err(|e| FlowError::Conversion(format!("failed to encode JSON input: {}", e)))
    }
}

impl FromByteOutput for Vec<u8> {
    fn from_byte_output(bytes: Vec<u8>) -> Result<Self, FlowError> {
        Ok(bytes)
    }
}

impl FromByteOutput for String {
    fn from_byte_output(bytes: Vec<u8>) -> Result<Self, FlowError> {
        String::from_utf8(bytes)
            .map_err(|e| FlowError::Conversion(format!("output is not valid UTF-8: {}", e)))
    }
}

impl<T: DeserializeOwned> FromByteOutput for Json<T> {
    fn from_byte_output(bytes: Vec<u8>) -> Result<Self, FlowError> {
        serde_json::from_slice(&bytes)
            .map(Json)
            .map_err(|e| FlowError::Conversion(format!("failed to decode JSON output: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tokio::io::AsyncReadExt;

    async fn drain(source: impl IntoByteSource) -> Vec<u8> {
        let mut out = Vec::new();
        source
            .into_byte_source()
            .unwrap()
            .read_to_end(&mut out)
            .await
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_text_and_bytes_are_passed_verbatim() {
        assert_eq!(drain("héllo").await, "héllo".as_bytes());
        assert_eq!(drain(String::from("abc")).await, b"abc");
        assert_eq!(drain(vec![0u8, 255]).await, vec![0u8, 255]);
        assert_eq!(drain(&b"raw"[..]).await, b"raw");
    }

    #[tokio::test]
    async fn test_stream_is_forwarded() {
        let reader = std::io::Cursor::new(b"streamed".to_vec());
        assert_eq!(drain(Stream(reader)).await, b"streamed");
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Order {
        id: u32,
        item: String,
    }

    #[tokio::test]
    async fn test_json_input_and_output() {
        let bytes = drain(Json(Order {
            id: 7,
            item: "anvil".into(),
        }))
        .await;
        assert_eq!(bytes, br#"{"id":7,"item":"anvil"}"#);

        let Json(order) = Json::<Order>::from_byte_output(bytes).unwrap();
        assert_eq!(order.item, "anvil");
    }

    #[test]
    fn test_invalid_output_is_a_conversion_error() {
        let err = String::from_byte_output(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, FlowError::Conversion(_)));

        let err = Json::<Order>::from_byte_output(b"not json".to_vec()).unwrap_err();
        assert!(err.to_string().contains("decode JSON"));
    }
}
