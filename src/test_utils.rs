//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid semver version string
    pub fn semver_version() -> impl Strategy<Value = String> {
        (0u32..100, 0u32..100, 0u32..100)
            .prop_map(|(major, minor, patch)| format!("{major}.{minor}.{patch}"))
    }

    /// Generate a zig target triple from the release matrix
    pub fn target_triple() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("x86_64-linux".to_string()),
            Just("x86_64-linux-musl".to_string()),
            Just("aarch64-linux".to_string()),
            Just("powerpc64le-linux".to_string()),
            Just("mips64el-linux-musl".to_string()),
            Just("aarch64-macos".to_string()),
            Just("x86_64-macos".to_string()),
            Just("x86_64-windows".to_string()),
            Just("aarch64-windows-gnu".to_string()),
            Just("wasm32-wasi".to_string()),
        ]
    }

    /// Generate an arbitrary `arch-os[-abi]` identifier
    pub fn arbitrary_triple() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9_]{1,10}", "[a-z]{3,8}", proptest::option::of("[a-z]{3,6}")).prop_map(
            |(arch, os, abi)| match abi {
                Some(abi) => format!("{arch}-{os}-{abi}"),
                None => format!("{arch}-{os}"),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_semver_version_generator(version in semver_version()) {
            prop_assert!(semver::Version::parse(&version).is_ok());
        }

        #[test]
        fn test_arbitrary_triple_generator(triple in arbitrary_triple()) {
            let parts: Vec<&str> = triple.split('-').collect();
            prop_assert!(parts.len() == 2 || parts.len() == 3);
            prop_assert!(parts.iter().all(|p| !p.is_empty()));
        }
    }
}
