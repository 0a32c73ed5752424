use anyhow::Result;
use bigdecimal::BigDecimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Days-worked threshold below which no insurance is deducted.
    pub min_insured_days: BigDecimal,
    /// Fixed statutory amount subtracted from the billing worker payout.
    pub statutory_deduction: BigDecimal,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/payroll".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            min_insured_days: decimal_var("PAYROLL_MIN_INSURED_DAYS", "7"),
            statutory_deduction: decimal_var("BILLING_STATUTORY_DEDUCTION", "149316"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn derivation_rules(&self) -> DerivationRules {
        DerivationRules {
            min_insured_days: self.min_insured_days.clone(),
            statutory_deduction: self.statutory_deduction.clone(),
        }
    }
}

/// The two business constants derivation depends on, split off from `Config`
/// so calculation code never reads the environment.
#[derive(Debug, Clone)]
pub struct DerivationRules {
    pub min_insured_days: BigDecimal,
    pub statutory_deduction: BigDecimal,
}

fn decimal_var(name: &str, default: &str) -> BigDecimal {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    BigDecimal::from_str(&raw).unwrap_or_else(|_| {
        log::warn!(
            "Invalid decimal in {}: {:?}, using default {}",
            name,
            raw,
            default
        );
        BigDecimal::from_str(default).expect("default is a valid decimal")
    })
}
