/// Read-through caching over Redis.
///
/// Looks the key up first; on a hit the cached value is returned as-is, on a
/// miss the block runs, its result is queued for a write-behind, and the
/// computed value is returned.
///
/// # Arguments
/// * `$cache`: cache instance exposing `fetch` and `write_behind`.
/// * `$key`: the `CacheKey` for the value.
/// * `$ttl`: time-to-live for the cached value, in seconds.
/// * `$block`: async block producing the value on a cache miss.
///
/// # Example
/// ```rust,ignore
/// let details = cached!(cache, CacheKey::GameDetails(app_id), DETAILS_CACHE_TTL, async move {
///     fetch_details_from_storefront(app_id)
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.fetch(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.write_behind(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
