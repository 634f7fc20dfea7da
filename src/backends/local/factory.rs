// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::handlers::*;
use crate::config::HandlerConfig;
use crate::traits::Handler;

/// Factory for creating local (in-process) handler instances
pub struct LocalHandlerFactory;

impl LocalHandlerFactory {
    /// Create a handler instance from configuration
    ///
    /// The `handler` field in the config determines which handler to create:
    /// - "change_text_case" -> ChangeTextCaseHandler (`case`: upper | lower, default upper)
    /// - "prefix_suffix_adder" -> PrefixSuffixAdderHandler (`prefix`, `suffix`)
    /// - "reverse_text" -> ReverseTextHandler
    pub fn create_handler(config: &HandlerConfig) -> Result<Arc<dyn Handler>, String> {
        let impl_name = config
            .handler
            .as_ref()
            .ok_or_else(|| format!("Handler '{}' missing 'handler' field", config.id))?;

        match impl_name.as_str() {
            "change_text_case" => {
                let case = match config.options.get("case") {
                    Some(value) => serde_yaml::from_value::<TextCase>(value.clone())
                        .map_err(|e| format!("invalid 'case' option: {}", e))?,
                    None => TextCase::Upper,
                };
                Ok(Arc::new(ChangeTextCaseHandler::new(case)))
            }
            "prefix_suffix_adder" => Ok(Arc::new(PrefixSuffixAdderHandler::new(
                PrefixSuffixConfig {
                    prefix: config.option_str("prefix").map(str::to_string),
                    suffix: config.option_str("suffix").map(str::to_string),
                },
            ))),
            "reverse_text" => Ok(Arc::new(ReverseTextHandler::new())),
            _ => Err(format!("Unknown local handler implementation: '{}'", impl_name)),
        }
    }

    /// List all available local handler implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["change_text_case", "prefix_suffix_adder", "reverse_text"]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(impl_name: &str) -> bool {
        Self::list_available_implementations().contains(&impl_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Context, Flow};
    use std::collections::HashMap;

    fn create_test_config(id: &str, impl_name: &str, options: &[(&str, &str)]) -> HandlerConfig {
        HandlerConfig {
            id: id.to_string(),
            handler: Some(impl_name.to_string()),
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), serde_yaml::Value::String(v.to_string())))
                .collect::<HashMap<_, _>>(),
            handlers: vec![],
        }
    }

    async fn run(config: &HandlerConfig, input: &str) -> String {
        let handler = LocalHandlerFactory::create_handler(config).unwrap();
        Flow::new()
            .append_arc(handler)
            .run(&Context::new(), input)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_change_text_case_handlers() {
        let test_cases = vec![
            (vec![("case", "upper")], "hello", "HELLO"),
            (vec![("case", "lower")], "HELLO", "hello"),
            (vec![], "hello", "HELLO"),
        ];

        for (options, input, expected) in test_cases {
            let config = create_test_config("test", "change_text_case", &options);
            assert_eq!(run(&config, input).await, expected, "options: {:?}", options);
        }
    }

    #[tokio::test]
    async fn test_create_prefix_suffix_adder_from_options() {
        let config = create_test_config(
            "test",
            "prefix_suffix_adder",
            &[("prefix", "("), ("suffix", ")")],
        );
        assert_eq!(run(&config, "wrapped").await, "(wrapped)");
    }

    #[test]
    fn test_invalid_case_option() {
        let config = create_test_config("test", "change_text_case", &[("case", "sarcastic")]);
        let err = LocalHandlerFactory::create_handler(&config).err().unwrap();
        assert!(err.contains("invalid 'case' option"));
    }

    #[test]
    fn test_unknown_and_missing_implementation() {
        let config = create_test_config("test", "nonexistent", &[]);
        let err = LocalHandlerFactory::create_handler(&config).err().unwrap();
        assert!(err.contains("Unknown local handler implementation"));

        let mut config = create_test_config("bare", "reverse_text", &[]);
        config.handler = None;
        let err = LocalHandlerFactory::create_handler(&config).err().unwrap();
        assert_eq!(err, "Handler 'bare' missing 'handler' field");
    }

    #[test]
    fn test_list_available_implementations() {
        let implementations = LocalHandlerFactory::list_available_implementations();
        assert_eq!(implementations.len(), 3);
        for name in implementations {
            assert!(LocalHandlerFactory::is_implementation_available(name));
        }
        assert!(!LocalHandlerFactory::is_implementation_available("token_counter"));
    }
}
