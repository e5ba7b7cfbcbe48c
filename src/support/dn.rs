//! Distinguished name normalisation.

/// Normalise a certificate DN for comparison: whitespace around `,` and `=`
/// is dropped, attribute values keep their case.
///
/// `"CN = node-1, OU=ops ,O=Example"` becomes `"CN=node-1,OU=ops,O=Example"`.
pub fn normalize_dn(dn: &str) -> String {
    dn.split(',')
        .map(|rdn| match rdn.split_once('=') {
            Some((key, value)) => format!("{}={}", key.trim(), value.trim()),
            None => rdn.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
