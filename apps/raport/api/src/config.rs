use core_config::{server::ServerConfig, Environment, FromEnv};
use domain_dispatch::{DispatchConfig, ProviderKind};

/// Application-specific configuration
/// Composes shared config components from the `core_config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: Environment,
    pub provider_kind: ProviderKind,
    pub dispatch: DispatchConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=3000
        let provider_kind =
            ProviderKind::from_env().map_err(|e| eyre::eyre!("Invalid MAIL_PROVIDER: {}", e))?;
        let dispatch = DispatchConfig::default();

        Ok(Self {
            server,
            environment,
            provider_kind,
            dispatch,
        })
    }
}
