use tower_http::compression::CompressionLayer;

/// Compresses rendered pages. Encoding is negotiated from `Accept-Encoding`; deflate is left out
/// since every browser that sends it also accepts gzip.
pub fn compression_layer() -> CompressionLayer {
    CompressionLayer::new().no_deflate()
}
