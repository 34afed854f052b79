//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{ContractTerms, DocumentKind};

use super::types::{ContractDefaults, DocumentSettings, DocumentsConfig, EngineConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── contract.yaml    # Default terms for new contracts
/// └── documents.yaml   # Per document kind settings
/// ```
///
/// # Example
///
/// ```no_run
/// use contract_engine::config::ConfigLoader;
/// use contract_engine::models::DocumentKind;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// let invoice = loader.document(DocumentKind::Invoice)?;
/// println!("Invoice title: {}", invoice.title);
/// # Ok::<(), contract_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The default terms are inconsistent (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let contract_path = path.join("contract.yaml");
        let defaults = Self::load_yaml::<ContractDefaults>(&contract_path)?;
        defaults
            .terms(Decimal::ZERO)
            .validate()
            .map_err(|e| EngineError::ConfigParseError {
                path: contract_path.display().to_string(),
                message: e.to_string(),
            })?;

        let documents_path = path.join("documents.yaml");
        let documents = Self::load_yaml::<DocumentsConfig>(&documents_path)?;

        tracing::debug!(
            path = %path.display(),
            documents = documents.documents.len(),
            "Loaded engine configuration"
        );

        Ok(Self {
            config: EngineConfig::new(defaults, documents.documents),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the default contract terms.
    pub fn defaults(&self) -> &ContractDefaults {
        self.config.defaults()
    }

    /// Gets the settings for a document kind.
    ///
    /// Returns `DocumentNotConfigured` if the kind has no settings.
    pub fn document(&self, kind: DocumentKind) -> EngineResult<&DocumentSettings> {
        self.config
            .documents()
            .get(&kind)
            .ok_or_else(|| EngineError::DocumentNotConfigured {
                kind: kind.to_string(),
            })
    }

    /// Builds terms for a new contract from the defaults.
    ///
    /// `price_text` is normalized the same way form input is, so
    /// `"600,000"` is accepted.
    pub fn new_terms(&self, price_text: &str) -> ContractTerms {
        self.defaults()
            .terms(crate::calculation::normalize_price(price_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoundType, Side, SplitPolicy};
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.defaults().hour_from, dec("140"));
        assert_eq!(loader.defaults().hour_to, dec("180"));
    }

    #[test]
    fn test_defaults_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let defaults = loader.defaults();

        assert_eq!(defaults.round_type, RoundType::Round);
        assert_eq!(defaults.round_digit, 1);
        assert_eq!(defaults.split_policy, SplitPolicy::HighLow);
        assert_eq!(defaults.payment_term, "月末締め翌月末");
    }

    #[test]
    fn test_get_document_settings() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let invoice = loader.document(DocumentKind::Invoice).unwrap();
        assert_eq!(invoice.title, "請求書");
        assert_eq!(invoice.side, Side::Claim);
        assert!(invoice.print_payment_due);

        let order = loader.document(DocumentKind::PurchaseOrder).unwrap();
        assert_eq!(order.title, "注文書");
        assert_eq!(order.side, Side::Order);

        let quote = loader.document(DocumentKind::Quote).unwrap();
        assert!(!quote.print_payment_due);
    }

    #[test]
    fn test_new_terms_normalizes_price() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let terms = loader.new_terms("650,000");

        assert_eq!(terms.base_price, dec("650000"));
        assert_eq!(terms.hour_from, dec("140"));
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        assert!(result.is_err());

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("contract.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_document_not_configured() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let mut documents = loader.config().documents().clone();
        documents.remove(&DocumentKind::Quote);
        let loader = ConfigLoader {
            config: EngineConfig::new(loader.defaults().clone(), documents),
        };

        match loader.document(DocumentKind::Quote) {
            Err(EngineError::DocumentNotConfigured { kind }) => assert_eq!(kind, "quote"),
            other => panic!("Expected DocumentNotConfigured, got {:?}", other),
        }
    }
}
