use std::path::Path;

use crate::{Config, GenerationConfig};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a provider table is inconsistent or invalid, or
    /// the image source settings are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_images()?;
        self.validate_telemetry()?;
        Ok(())
    }

    /// Generation configs for every provider table, in file order
    pub fn generation_configs(&self) -> Vec<GenerationConfig> {
        self.providers
            .iter()
            .map(|(name, provider)| provider.to_generation_config(name))
            .collect()
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        for (name, provider) in &self.providers {
            if let Some(declared) = &provider.provider
                && declared != name
            {
                anyhow::bail!("provider table '{name}' declares mismatched provider '{declared}'");
            }

            provider
                .to_generation_config(name)
                .validate()
                .map_err(|e| anyhow::anyhow!("provider '{name}': {e}"))?;
        }

        Ok(())
    }

    fn validate_images(&self) -> anyhow::Result<()> {
        if self.images.http.enabled && self.images.http.timeout_secs == 0 {
            anyhow::bail!("images.http.timeout_secs must be greater than 0");
        }

        if let Some(ref s3) = self.images.s3 {
            if s3.region.trim().is_empty() {
                anyhow::bail!("images.s3.region must not be empty");
            }
            if s3.access_key_id.is_some() != s3.secret_access_key.is_some() {
                anyhow::bail!("images.s3 requires both access_key_id and secret_access_key, or neither");
            }
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        if let Some(telemetry) = &self.telemetry
            && !(0.0..=1.0).contains(&telemetry.sampling_rate)
        {
            anyhow::bail!("telemetry.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
