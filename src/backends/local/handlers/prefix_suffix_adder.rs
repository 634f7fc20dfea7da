// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::traits::{Handler, HandlerError, Request, Response};

/// Configuration for the Prefix/Suffix Adder handler
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PrefixSuffixConfig {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Prefix/Suffix Adder handler - wraps the stream in a prefix and/or suffix.
///
/// The prefix goes out before the first input byte is read and the body is
/// copied through untouched, so the handler never buffers its input.
pub struct PrefixSuffixAdderHandler {
    config: PrefixSuffixConfig,
}

impl PrefixSuffixAdderHandler {
    pub fn new(config: PrefixSuffixConfig) -> Self {
        Self { config }
    }

    pub fn with_prefix(prefix: String) -> Self {
        Self::new(PrefixSuffixConfig {
            prefix: Some(prefix),
            suffix: None,
        })
    }

    pub fn with_suffix(suffix: String) -> Self {
        Self::new(PrefixSuffixConfig {
            prefix: None,
            suffix: Some(suffix),
        })
    }

    pub fn with_prefix_and_suffix(prefix: String, suffix: String) -> Self {
        Self::new(PrefixSuffixConfig {
            prefix: Some(prefix),
            suffix: Some(suffix),
        })
    }
}

#[async_trait]
impl Handler for PrefixSuffixAdderHandler {
    async fn serve(&self, mut req: Request, mut res: Response) -> Result<(), HandlerError> {
        if let Some(prefix) = &self.config.prefix {
            res.write_str(prefix).await?;
        }
        tokio::io::copy(&mut req.data, &mut res.data).await?;
        if let Some(suffix) = &self.config.suffix {
            res.write_str(suffix).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "prefix_suffix_adder"
    }
}
