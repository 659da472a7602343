use crate::error::ConfigError;
use core_types::{AssetSymbol, Palette};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The fiat currency assets are priced in on the exchange (e.g. "USD").
    pub fiat_currency: String,
    /// The currency totals are shown in on the display (e.g. "GBP").
    pub local_currency: String,
    /// Account identifiers per asset, keyed by asset code ("XBT", "ETH", ...).
    /// Kept as strings here and resolved by [`Config::asset_accounts`].
    #[serde(default)]
    pub accounts: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub formatting: FormattingConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub logos: LogoUrls,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Canvas geometry and palette of the attached panel.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
    /// Bounding box a logo is thumbnailed into.
    pub logo_width: u32,
    pub logo_height: u32,
    /// Blank columns between the logo column and the text.
    pub logo_gutter: u32,
    /// Text is never shrunk below this pixel size.
    pub min_font_size: u32,
    /// How long each card stays on the panel.
    #[serde(with = "humantime_serde")]
    pub slide_delay: Duration,
    /// Where the PNG driver writes cards when no panel is attached.
    pub output_dir: PathBuf,
}

/// Number formatting used for currency strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    pub thousands_separator: String,
    pub decimal_separator: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

/// Base URLs of every remote source, so each can be redirected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub kraken: String,
    pub fiat_rates: String,
    pub blockonomics: String,
    pub ethplorer: String,
    pub ethplorer_api_key: String,
    pub blockcypher: String,
    pub ripple_data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogoUrls {
    pub xbt: String,
    pub eth: String,
    pub ltc: String,
    pub xrp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs also go to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// Everything except the currencies and accounts has a sensible default, so a
// minimal config file only needs those.

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 212,
            height: 104,
            palette: Palette::black_white_red(),
            logo_width: 70,
            logo_height: 104,
            logo_gutter: 1,
            min_font_size: 6,
            slide_delay: Duration::from_secs(30),
            output_dir: PathBuf::from("cards"),
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("inkfolio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            kraken: "https://api.kraken.com".to_string(),
            fiat_rates: "https://api.frankfurter.dev/v1".to_string(),
            blockonomics: "https://www.blockonomics.co".to_string(),
            ethplorer: "https://api.ethplorer.io".to_string(),
            ethplorer_api_key: "freekey".to_string(),
            blockcypher: "https://api.blockcypher.com".to_string(),
            ripple_data: "https://data.ripple.com".to_string(),
        }
    }
}

impl Default for LogoUrls {
    fn default() -> Self {
        Self {
            xbt: "https://bitcoin.org/img/icons/opengraph.png".to_string(),
            eth: "https://www.ethereum.org/images/logos/ETHEREUM-ICON_Black_small.png".to_string(),
            ltc: "http://ltc.133.io/images/logosizes/ltc800.png".to_string(),
            xrp: "https://www.shareicon.net/data/512x512/2016/07/08/117527_ripple_512x512.png"
                .to_string(),
        }
    }
}

impl LogoUrls {
    pub fn for_asset(&self, symbol: AssetSymbol) -> &str {
        match symbol {
            AssetSymbol::Xbt => &self.xbt,
            AssetSymbol::Eth => &self.eth,
            AssetSymbol::Ltc => &self.ltc,
            AssetSymbol::Xrp => &self.xrp,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            directory: None,
        }
    }
}

impl Config {
    /// Resolves the account table into typed asset keys, dropping assets
    /// without any account.
    pub fn asset_accounts(&self) -> Result<BTreeMap<AssetSymbol, Vec<String>>, ConfigError> {
        let mut resolved = BTreeMap::new();
        for (key, accounts) in &self.accounts {
            let symbol: AssetSymbol = key
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("accounts: {}", e)))?;
            let accounts: Vec<String> = accounts
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            if !accounts.is_empty() {
                resolved.entry(symbol).or_insert_with(Vec::new).extend(accounts);
            }
        }
        Ok(resolved)
    }

    /// Checks everything serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_currency("fiat_currency", &self.fiat_currency)?;
        validate_currency("local_currency", &self.local_currency)?;

        if self.asset_accounts()?.is_empty() {
            return Err(ConfigError::ValidationError(
                "accounts must list at least one account for one asset".to_string(),
            ));
        }

        let display = &self.display;
        if display.width == 0 || display.height == 0 {
            return Err(ConfigError::ValidationError(
                "display width and height must be greater than 0".to_string(),
            ));
        }
        if display.logo_width + display.logo_gutter >= display.width {
            return Err(ConfigError::ValidationError(
                "logo column leaves no room for text".to_string(),
            ));
        }
        if display.min_font_size == 0 {
            return Err(ConfigError::ValidationError(
                "min_font_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_currency(field: &str, code: &str) -> Result<(), ConfigError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be a three letter upper-case currency code, got '{}'",
            field, code
        )))
    }
}
