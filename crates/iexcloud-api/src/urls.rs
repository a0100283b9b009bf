//! IEX Cloud request URL construction.

use iexcloud_fetch::{InvalidUrlError, Param, Params, Url};
use iexcloud_types::{Endpoint, EndpointOptions, Keys, Symbol};

use crate::ApiConfig;

fn root(config: &ApiConfig, options: &EndpointOptions) -> String {
    format!("{}{}", config.base_url(options.data_type), options.version)
}

fn append_options(params: &mut Params, options: &EndpointOptions) -> Result<(), InvalidUrlError> {
    for (key, value) in &options.options {
        params.insert(Param::new(key, value)?);
    }
    Ok(())
}

/// Builds the URL for a basic (non-stock) endpoint.
///
/// URL format: `{base}{version}/{path}?token={secret}&{options...}`
///
/// # Example
///
/// ```
/// use iexcloud_api::{ApiConfig, urls::endpoint_url};
/// use iexcloud_types::{Endpoint, EndpointOptions, Keys};
///
/// let keys = Keys {
///     secret_key: "sk_123".into(),
///     ..Keys::default()
/// };
/// let url = endpoint_url(
///     &ApiConfig::default(),
///     &keys,
///     Endpoint::SystemStatus,
///     &EndpointOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(url.as_str(), "https://cloud.iexapis.com/stable/status?token=sk_123");
/// ```
///
/// # Errors
///
/// Returns an [`InvalidUrlError`] if the key for the requested data type is
/// empty, or an option has an empty key or value.
pub fn endpoint_url(
    config: &ApiConfig,
    keys: &Keys,
    endpoint: Endpoint,
    options: &EndpointOptions,
) -> Result<Url, InvalidUrlError> {
    let base = format!("{}/{}", root(config, options), endpoint.path());

    let mut params = Params::new();
    params.insert(Param::new("token", keys.token(options.data_type))?);
    append_options(&mut params, options)?;

    Url::with_params(base, &params)
}

/// Builds a market batch URL querying several stock endpoints for several
/// symbols at once.
///
/// URL format:
/// `{base}{version}/stock/market/batch?symbols={A,B}&token={secret}&types={quote,company}&{options...}`
///
/// Symbols and types are sorted so the same request always yields the same
/// URL. Options never override `symbols`, `types` or `token`.
///
/// # Errors
///
/// Returns an [`InvalidUrlError`] if there are no symbols or no endpoints, the
/// key is empty, or an option has an empty key or value.
pub fn stock_batch_url<'a>(
    config: &ApiConfig,
    keys: &Keys,
    endpoints: &[Endpoint],
    symbols: impl IntoIterator<Item = &'a Symbol>,
    options: &EndpointOptions,
) -> Result<Url, InvalidUrlError> {
    let base = format!("{}/stock/market/batch", root(config, options));

    let mut symbols: Vec<&str> = symbols.into_iter().map(|s| s.as_str()).collect();
    symbols.sort_unstable();
    symbols.dedup();

    let mut types: Vec<&str> = endpoints.iter().map(Endpoint::path).collect();
    types.sort_unstable();
    types.dedup();

    let mut params = Params::new();
    params.insert(Param::list("symbols", symbols)?);
    params.insert(Param::list("types", types)?);
    params.insert(Param::new("token", keys.token(options.data_type))?);
    append_options(&mut params, options)?;

    Url::with_params(base, &params)
}
