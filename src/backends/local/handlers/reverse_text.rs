// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::traits::{Handler, HandlerError, Request, Response};

/// Reverse Text handler - reverses the characters of its whole input.
///
/// Needs the last character before it can emit the first, so unlike the other
/// built-ins it buffers everything.
#[derive(Debug, Default)]
pub struct ReverseTextHandler;

impl ReverseTextHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for ReverseTextHandler {
    async fn serve(&self, mut req: Request, mut res: Response) -> Result<(), HandlerError> {
        let input = req.read_string().await?;
        let reversed: String = input.chars().rev().collect();
        res.write_str(&reversed).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "reverse_text"
    }
}
