// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::AsyncReadExt;

use super::CHUNK_SIZE;
use crate::traits::{Handler, HandlerError, Request, Response};

/// Target case for [`ChangeTextCaseHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    Upper,
    Lower,
}

/// Change Text Case handler - converts streamed UTF-8 text to upper or lower case.
///
/// Text is converted chunk by chunk as it arrives. A multi-byte character
/// split across two reads is held back until it is complete; input that is
/// not valid UTF-8 fails the stage with `InvalidData`.
pub struct ChangeTextCaseHandler {
    case: TextCase,
}

impl ChangeTextCaseHandler {
    pub fn new(case: TextCase) -> Self {
        Self { case }
    }

    pub fn upper() -> Self {
        Self::new(TextCase::Upper)
    }

    pub fn lower() -> Self {
        Self::new(TextCase::Lower)
    }

    fn convert(&self, text: &str) -> String {
        match self.case {
            TextCase::Upper => text.to_uppercase(),
            TextCase::Lower => text.to_lowercase(),
        }
    }
}

/// Split off the longest valid UTF-8 prefix of `pending`, leaving an
/// incomplete trailing character (if any) behind.
fn take_complete_utf8(pending: &mut Vec<u8>) -> io::Result<String> {
    let valid = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
    };
    let rest = pending.split_off(valid);
    let complete = std::mem::replace(pending, rest);
    String::from_utf8(complete).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[async_trait]
impl Handler for ChangeTextCaseHandler {
    async fn serve(&self, mut req: Request, mut res: Response) -> Result<(), HandlerError> {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut pending = Vec::new();

        loop {
            let n = req.data.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            pending.extend_from_slice(&buf[..n]);
            let text = take_complete_utf8(&mut pending)?;
            if !text.is_empty() {
                res.write_str(&self.convert(&text)).await?;
            }
        }

        if !pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "input ended in the middle of a UTF-8 character",
            )
            .into());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "change_text_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Context, Flow};
    use crate::errors::FlowError;

    #[tokio::test]
    async fn test_upper_and_lower() {
        let upper = Flow::new().append(ChangeTextCaseHandler::upper());
        let output: String = upper.run(&Context::new(), "Hello World").await.unwrap();
        assert_eq!(output, "HELLO WORLD");

        let lower = Flow::new().append(ChangeTextCaseHandler::lower());
        let output: String = lower.run(&Context::new(), "Hello World").await.unwrap();
        assert_eq!(output, "hello world");
    }

    #[tokio::test]
    async fn test_multibyte_characters_split_across_reads() {
        // One-byte channels force every read to return a single byte.
        let flow = Flow::new()
            .channel_capacity(1)
            .append(ChangeTextCaseHandler::upper());

        let output: String = flow.run(&Context::new(), "héllo wörld ß").await.unwrap();
        assert_eq!(output, "HÉLLO WÖRLD SS");
    }

    #[tokio::test]
    async fn test_invalid_utf8_fails_the_stage() {
        let flow = Flow::new().append(ChangeTextCaseHandler::upper());

        let result: Result<Vec<u8>, _> = flow.run(&Context::new(), vec![b'a', 0xff, b'b']).await;
        assert!(matches!(result, Err(FlowError::Stage { index: 0, .. })));
    }

    #[tokio::test]
    async fn test_truncated_character_fails_the_stage() {
        let flow = Flow::new().append(ChangeTextCaseHandler::lower());

        let result: Result<Vec<u8>, _> = flow.run(&Context::new(), vec![b'A', 0xc3]).await;
        match result {
            Err(FlowError::Stage { handler, source, .. }) => {
                assert_eq!(handler, "change_text_case");
                assert!(source.to_string().contains("UTF-8"));
            }
            other => panic!("expected stage failure, got {:?}", other),
        }
    }
}
