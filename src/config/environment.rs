//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

use crate::models::ride::RideSortOrder;

/// Backend de persistencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconocido: '{}'", other)),
        }
    }
}

/// Procesador de pagos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentProvider {
    Stripe,
    Mock,
}

impl FromStr for PaymentProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stripe" => Ok(PaymentProvider::Stripe),
            "mock" => Ok(PaymentProvider::Mock),
            other => Err(anyhow!("PAYMENT_PROVIDER desconocido: '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    // Pagos
    pub payment_provider: PaymentProvider,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub payment_currency: String,
    // Reservas y catálogo
    pub insurance_per_day: Decimal,
    pub ride_sort_order: RideSortOrder,
}

impl Default for EnvironmentConfig {
    /// Valores de desarrollo: memoria + procesador simulado
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 5000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            storage_backend: StorageBackend::Memory,
            jwt_secret: "development-secret-change-me".to_string(),
            jwt_expiration: 86_400,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
            payment_provider: PaymentProvider::Mock,
            stripe_secret_key: None,
            stripe_api_base: "https://api.stripe.com".to_string(),
            payment_currency: "usd".to_string(),
            insurance_per_day: Decimal::from(15),
            ride_sort_order: RideSortOrder::PriceAsc,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Postgres,
        };
        let payment_provider = match var("PAYMENT_PROVIDER") {
            Some(value) => value.parse()?,
            None => PaymentProvider::Stripe,
        };

        let database_url = var("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORAGE_BACKEND=postgres"));
        }

        let stripe_secret_key = var("STRIPE_SECRET_KEY");
        if payment_provider == PaymentProvider::Stripe && stripe_secret_key.is_none() {
            return Err(anyhow!("Missing required Stripe secret: STRIPE_SECRET_KEY"));
        }

        let insurance_per_day = match var("INSURANCE_PER_DAY") {
            Some(value) => Decimal::from_str(value.trim())
                .with_context(|| format!("INSURANCE_PER_DAY must be a decimal, got '{}'", value))?,
            None => defaults.insurance_per_day,
        };
        if insurance_per_day < Decimal::ZERO {
            return Err(anyhow!("INSURANCE_PER_DAY must not be negative"));
        }

        let ride_sort_order = match var("RIDE_SORT_ORDER") {
            Some(value) => value
                .parse()
                .map_err(|_| anyhow!("RIDE_SORT_ORDER must be 'price_asc' or 'rating_desc', got '{}'", value))?,
            None => defaults.ride_sort_order,
        };

        Ok(Self {
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_or("PORT", var("PORT"), defaults.port)?,
            host: var("HOST").unwrap_or(defaults.host),
            database_url,
            storage_backend,
            jwt_secret: var("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?,
            jwt_expiration: parse_or("JWT_EXPIRATION", var("JWT_EXPIRATION"), defaults.jwt_expiration)?,
            cors_origins: var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout_secs: parse_or(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            payment_provider,
            stripe_secret_key,
            stripe_api_base: var("STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            payment_currency: var("PAYMENT_CURRENCY")
                .map(|c| c.trim().to_lowercase())
                .unwrap_or(defaults.payment_currency),
            insurance_per_day,
            ride_sort_order,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_memory_and_mock_need_no_secrets() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("PAYMENT_PROVIDER", "mock"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.payment_provider, PaymentProvider::Mock);
        assert_eq!(config.port, 5000);
        assert_eq!(config.insurance_per_day, Decimal::from(15));
        assert_eq!(config.ride_sort_order, RideSortOrder::PriceAsc);
        assert_eq!(config.payment_currency, "usd");
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let result = EnvironmentConfig::from_lookup(lookup(&[
            ("PAYMENT_PROVIDER", "mock"),
            ("JWT_SECRET", "s3cret"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_stripe_requires_secret_key() {
        let result = EnvironmentConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("PAYMENT_PROVIDER", "mock"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("INSURANCE_PER_DAY", "12.50"),
            ("RIDE_SORT_ORDER", "rating_desc"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.insurance_per_day, Decimal::new(1250, 2));
        assert_eq!(config.ride_sort_order, RideSortOrder::RatingDesc);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let result = EnvironmentConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "memory"),
            ("PAYMENT_PROVIDER", "mock"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }
}
