//! OMDb API key resolution and system keyring storage.

use keyring::Entry;

const OMDB_SERVICE_NAME: &str = "adaptation_ledger.omdb";
const OMDB_ACCOUNT_NAME: &str = "api_key";
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

fn omdb_entry() -> Result<Entry, String> {
    Entry::new(OMDB_SERVICE_NAME, OMDB_ACCOUNT_NAME)
        .map_err(|err| describe_keyring_failure("open the OMDb keyring entry", &err))
}

/// One-line message for a keyring error, pointing at the environment
/// variable when the platform store cannot be reached at all.
fn describe_keyring_failure(action: &str, error: &keyring::Error) -> String {
    match error {
        keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => format!(
            "could not {action}: {error}. The system keyring is unreachable; \
             export {OMDB_API_KEY_ENV} instead"
        ),
        _ => format!("could not {action}: {error}"),
    }
}

/// Saves the OMDb API key into the OS keyring.
pub fn set_omdb_api_key(api_key: &str) -> Result<(), String> {
    omdb_entry()?
        .set_password(api_key)
        .map_err(|err| describe_keyring_failure("store the OMDb API key", &err))
}

/// Loads the OMDb API key from the OS keyring.
pub fn get_omdb_api_key() -> Result<Option<String>, String> {
    match omdb_entry()?.get_password() {
        Ok(api_key) => Ok(Some(api_key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(describe_keyring_failure("read the OMDb API key", &err)),
    }
}

/// Picks the first non-empty key from config, environment, then keyring.
pub fn resolve_omdb_api_key(
    configured: &str,
    from_env: Option<String>,
    from_keyring: impl FnOnce() -> Result<Option<String>, String>,
) -> Result<Option<String>, String> {
    let configured = configured.trim();
    if !configured.is_empty() {
        return Ok(Some(configured.to_string()));
    }
    if let Some(env_key) = from_env.map(|key| key.trim().to_string()) {
        if !env_key.is_empty() {
            return Ok(Some(env_key));
        }
    }
    Ok(from_keyring()?.filter(|key| !key.trim().is_empty()))
}
