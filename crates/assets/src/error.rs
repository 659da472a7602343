use api_client::error::ApiError;
use core_types::AssetSymbol;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to fetch the {asset} balance: {source}")]
    Fetch {
        asset: AssetSymbol,
        #[source]
        source: ApiError,
    },

    #[error("No accounts configured for {0}")]
    NoAccounts(AssetSymbol),
}
