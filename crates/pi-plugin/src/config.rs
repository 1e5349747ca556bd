//! # Pi Plugin Configuration
//!
//! Defaults, host plugin settings and validation.

use crate::codec::BillingStatusCodec;
use crate::domain::{PiError, PiResult, DEFAULT_CACHE_LIMIT};
use serde::{Deserialize, Serialize};

/// Plugin id used in error replies and blob descriptors.
pub const PLUGIN_ID: &str = "pi";

/// Host setting key for the billing status change limit.
pub const SETTING_BILLING_STATUS_CHANGES_MAX: &str = "billingstatuschangesmax";

/// Default number of billing status changes allowed per proposal.
pub const DEFAULT_BILLING_STATUS_CHANGES_MAX: u32 = 1;

/// A host-provided plugin setting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSetting {
    /// Setting key
    pub key: String,
    /// Raw setting value
    pub value: String,
}

impl PluginSetting {
    /// Create a setting.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Pi plugin configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiConfig {
    /// Plugin id.
    pub plugin_id: String,

    /// Maximum billing status changes per proposal.
    pub billing_status_changes_max: u32,

    /// Maximum number of tokens held by the summary cache.
    pub summary_cache_limit: usize,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            plugin_id: PLUGIN_ID.to_string(),
            billing_status_changes_max: DEFAULT_BILLING_STATUS_CHANGES_MAX,
            summary_cache_limit: DEFAULT_CACHE_LIMIT,
        }
    }
}

impl PiConfig {
    /// Create a config for testing (small cache, room for several changes).
    pub fn for_testing() -> Self {
        Self {
            plugin_id: PLUGIN_ID.to_string(),
            billing_status_changes_max: 3,
            summary_cache_limit: 16,
        }
    }

    /// Apply host settings over the defaults.
    pub fn from_settings(settings: &[PluginSetting]) -> PiResult<Self> {
        let mut config = Self::default();
        for setting in settings {
            config.apply(setting)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, setting: &PluginSetting) -> PiResult<()> {
        match setting.key.as_str() {
            SETTING_BILLING_STATUS_CHANGES_MAX => {
                let max: u32 = setting.value.trim().parse().map_err(|e| {
                    PiError::Config(format!(
                        "{}: invalid value {:?}: {}",
                        setting.key, setting.value, e
                    ))
                })?;
                if max == 0 {
                    return Err(PiError::Config(format!("{} must be positive", setting.key)));
                }
                self.billing_status_changes_max = max;
                tracing::info!(key = %setting.key, value = max, "Applied plugin setting");
                Ok(())
            }
            _ => Err(PiError::Config(format!(
                "invalid plugin setting: {}",
                setting.key
            ))),
        }
    }

    /// Check the configuration for values the plugin cannot run with.
    pub fn validate(&self) -> PiResult<()> {
        if self.plugin_id.is_empty() {
            return Err(PiError::Config("plugin id must not be empty".into()));
        }
        if self.billing_status_changes_max == 0 {
            return Err(PiError::Config(
                "billing status changes max must be positive".into(),
            ));
        }
        if self.summary_cache_limit == 0 {
            return Err(PiError::Config(
                "summary cache limit must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Codec for this plugin's billing status blobs.
    pub fn codec(&self) -> BillingStatusCodec {
        BillingStatusCodec::new(&self.plugin_id)
    }

    /// Descriptor of this plugin's billing status blobs.
    pub fn data_descriptor(&self) -> String {
        self.codec().descriptor().to_string()
    }
}
